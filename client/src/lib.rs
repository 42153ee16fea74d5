use std::path::Path;

use kernel::{Deleted, ErrorReply, Report};
use reqwest::multipart::Form;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use resource::Resource;

pub mod resource;
pub mod store;

pub use reqwest::multipart::Part;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Report not found")]
    NotFound,
    /// Server-side failure, carrying the reply's error text verbatim.
    #[error("{0}")]
    Api(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid base URI: {0}")]
    InvalidUri(String),
}

/// Scalar report fields sent wholesale on create and update.
#[derive(Debug, Clone)]
pub struct ReportFields {
    pub sender_name: String,
    pub age: i64,
    pub job: String,
}

/// HTTP access to the report service.
pub struct ReportsApi {
    base: Resource,
    client: Client,
}

impl ReportsApi {
    pub fn new(uri: &str) -> Result<Self, ClientError> {
        let base = Resource::new(uri).ok_or_else(|| ClientError::InvalidUri(uri.to_owned()))?;
        Ok(Self {
            base,
            client: Client::new(),
        })
    }

    pub async fn list(&self) -> Result<Vec<Report>, ClientError> {
        let response = self.client.get(self.reports().to_string()).send().await?;
        decode(response).await
    }

    pub async fn get(&self, id: &str) -> Result<Report, ClientError> {
        let response = self.client.get(self.report(id).to_string()).send().await?;
        decode(response).await
    }

    pub async fn create(
        &self,
        fields: &ReportFields,
        file: Option<Part>,
    ) -> Result<Vec<Report>, ClientError> {
        let form = report_form(fields, file, false);
        let response = self
            .client
            .post(self.reports().to_string())
            .multipart(form)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn update(
        &self,
        id: &str,
        fields: &ReportFields,
        file: Option<Part>,
        remove_file: bool,
    ) -> Result<Vec<Report>, ClientError> {
        let form = report_form(fields, file, remove_file);
        let response = self
            .client
            .put(self.report(id).to_string())
            .multipart(form)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn delete(&self, id: &str) -> Result<Deleted, ClientError> {
        let response = self
            .client
            .delete(self.report(id).to_string())
            .send()
            .await?;
        decode(response).await
    }

    fn reports(&self) -> Resource {
        let mut resource = self.base.clone();
        resource.append_path("reports");
        resource
    }

    fn report(&self, id: &str) -> Resource {
        let mut resource = self.reports();
        resource.append_path(id);
        resource
    }
}

fn report_form(fields: &ReportFields, file: Option<Part>, remove_file: bool) -> Form {
    let mut form = Form::new()
        .text("sender_name", fields.sender_name.clone())
        .text("age", fields.age.to_string())
        .text("job", fields.job.clone());
    if remove_file {
        form = form.text("remove_file", "true");
    }
    if let Some(part) = file {
        form = form.part("file", part);
    }
    form
}

/// Builds a multipart file part streaming from disk.
pub async fn file_part(path: &Path) -> std::io::Result<Part> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_owned();
    let f = File::open(path).await?;
    let meta = f.metadata().await?;
    let stream = ReaderStream::new(f);
    let body = reqwest::Body::wrap_stream(stream);
    Ok(Part::stream_with_length(body, meta.len()).file_name(file_name))
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound);
    }
    let reply: ErrorReply = response.json().await.unwrap_or_else(|_| ErrorReply {
        error: status.to_string(),
    });
    Err(ClientError::Api(reply.error))
}
