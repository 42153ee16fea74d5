#![allow(clippy::unused_async)]
use crate::domain::Storage;
use crate::error::ApiError;
use crate::object_key;
use crate::sqlite::{Mode, Sqlite};
use axum::response::IntoResponse;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use kernel::{Deleted, ErrorReply, Report};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use axum::extract::{Multipart, Path, State};

const OCTET_STREAM: &str = "application/octet-stream";

struct UploadedFile {
    file_name: String,
    content_type: String,
    data: Vec<u8>,
}

/// Multipart payload shared by create and update.
#[derive(Default)]
struct ReportForm {
    sender_name: String,
    age: Option<i64>,
    job: String,
    remove_file: bool,
    file: Option<UploadedFile>,
}

impl ReportForm {
    fn age(&self) -> Result<i64, ApiError> {
        self.age
            .ok_or_else(|| ApiError::Internal(String::from("age field is required")))
    }
}

async fn read_form(multipart: &mut Multipart) -> Result<ReportForm, ApiError> {
    let mut form = ReportForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::internal(&e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "sender_name" => {
                form.sender_name = field.text().await.map_err(|e| ApiError::internal(&e))?;
            }
            "age" => {
                let text = field.text().await.map_err(|e| ApiError::internal(&e))?;
                let age = text
                    .trim()
                    .parse()
                    .map_err(|e| ApiError::Internal(format!("invalid age: {e}")))?;
                form.age = Some(age);
            }
            "job" => {
                form.job = field.text().await.map_err(|e| ApiError::internal(&e))?;
            }
            "remove_file" => {
                form.remove_file = field.text().await.map_err(|e| ApiError::internal(&e))? == "true";
            }
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or(OCTET_STREAM).to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::internal(&e))?
                    .to_vec();
                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }
    Ok(form)
}

fn upload_file(repository: &mut Sqlite, file: UploadedFile) -> Result<String, ApiError> {
    let key = object_key::object_key(&file.file_name);
    let stored = repository.put_blob(&key, &file.content_type, file.data)?;
    tracing::info!("file: {} stored: {} bytes", key, stored);
    Ok(object_key::file_url(&key))
}

fn remove_file(repository: &mut Sqlite, file_url: &str) {
    let Some(key) = object_key::key_from_url(file_url) else {
        tracing::error!("file url '{file_url}' has no object key");
        return;
    };
    match repository.delete_blob(key) {
        Ok(blobs) => tracing::info!("file: {key} deleted, blobs removed {blobs}"),
        Err(e) => tracing::error!("file '{key}' not deleted. Error: {e}"),
    }
}

/// Lists all reports.
#[utoipa::path(
    get,
    path = "/reports",
    responses(
        (status = 200, description = "List all reports successfully", body = [Report]),
        (status = 500, description = "Server error", body = ErrorReply)
    ),
    tag = "reports",
)]
pub async fn get_reports(State(db): State<Arc<PathBuf>>) -> Result<impl IntoResponse, ApiError> {
    execute(&db, Mode::ReadOnly, move |mut repository| {
        let reports = repository.get_reports()?;
        Ok(Json(reports))
    })
}

/// Gets a single report with its attachment content inlined.
#[utoipa::path(
    get,
    path = "/reports/{id}",
    responses(
        (status = 200, description = "Report found", body = Report),
        (status = 404, description = "Report not found", body = ErrorReply),
        (status = 500, description = "Server error", body = ErrorReply)
    ),
    tag = "reports",
    params(
        ("id" = String, Path, description = "Report id")
    ),
)]
pub async fn get_report(
    Path(id): Path<String>,
    State(db): State<Arc<PathBuf>>,
) -> Result<impl IntoResponse, ApiError> {
    execute(&db, Mode::ReadOnly, move |mut repository| {
        let mut report = repository.get_report(&id)?;
        if let Some(url) = report.file_url.clone() {
            let blob = object_key::key_from_url(&url).and_then(|key| repository.get_blob(key).ok());
            let Some((_, data)) = blob else {
                return Err(ApiError::Internal(String::from(
                    "Error fetching file from storage",
                )));
            };
            report.file = Some(BASE64.encode(data));
        }
        Ok(Json(report))
    })
}

/// Creates a report from multipart form fields, uploading the optional
/// attachment first.
#[utoipa::path(
    post,
    path = "/reports",
    responses(
        (status = 200, description = "Report created successfully", body = [Report]),
        (status = 500, description = "Server error", body = ErrorReply)
    ),
    tag = "reports",
)]
pub async fn create_report(
    State(db): State<Arc<PathBuf>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(&mut multipart).await?;
    let age = form.age()?;
    execute(&db, Mode::ReadWrite, move |mut repository| {
        let file_url = match form.file {
            Some(file) => Some(upload_file(&mut repository, file)?),
            None => None,
        };

        let report = Report {
            id: Uuid::new_v4().to_string(),
            sender_name: form.sender_name,
            age,
            job: form.job,
            file_url,
            file: None,
        };
        repository.insert_report(&report)?;
        tracing::info!("report {} created", report.id);
        Ok(Json(vec![report]))
    })
}

/// Updates a report wholesale, applying the three-way file policy:
/// explicit removal, replacement by a new upload, or no change.
#[utoipa::path(
    put,
    path = "/reports/{id}",
    responses(
        (status = 200, description = "Report updated successfully", body = [Report]),
        (status = 404, description = "Report not found", body = ErrorReply),
        (status = 500, description = "Server error", body = ErrorReply)
    ),
    tag = "reports",
    params(
        ("id" = String, Path, description = "Report id")
    ),
)]
pub async fn update_report(
    Path(id): Path<String>,
    State(db): State<Arc<PathBuf>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(&mut multipart).await?;
    let age = form.age()?;
    execute(&db, Mode::ReadWrite, move |mut repository| {
        let original = repository.get_report(&id)?;

        let mut file_url = original.file_url.clone();
        if form.remove_file {
            if let Some(url) = file_url.take() {
                remove_file(&mut repository, &url);
            }
        }
        if let Some(file) = form.file {
            // Old blob goes away only after the new one has landed.
            let uploaded = upload_file(&mut repository, file)?;
            if let Some(url) = original.file_url.as_deref() {
                remove_file(&mut repository, url);
            }
            file_url = Some(uploaded);
        }

        let report = Report {
            id: original.id,
            sender_name: form.sender_name,
            age,
            job: form.job,
            file_url,
            file: None,
        };
        let rows = repository.update_report(&report)?;
        tracing::info!("report {} updated, rows affected {rows}", report.id);
        Ok(Json(vec![report]))
    })
}

/// Deletes a report and its stored attachment, if any.
#[utoipa::path(
    delete,
    path = "/reports/{id}",
    responses(
        (status = 200, description = "Report deleted successfully", body = Deleted),
        (status = 404, description = "Report not found", body = ErrorReply),
        (status = 500, description = "Server error", body = ErrorReply)
    ),
    tag = "reports",
    params(
        ("id" = String, Path, description = "Report id")
    ),
)]
pub async fn delete_report(
    Path(id): Path<String>,
    State(db): State<Arc<PathBuf>>,
) -> Result<impl IntoResponse, ApiError> {
    execute(&db, Mode::ReadWrite, move |mut repository| {
        let report = repository.get_report(&id)?;
        if let Some(url) = report.file_url.as_deref() {
            remove_file(&mut repository, url);
        }
        repository.delete_report(&id)?;
        tracing::info!("report {id} deleted");
        Ok(Json(Deleted {
            message: String::from("Report deleted successfully!"),
        }))
    })
}

fn execute<F, R>(db: &Arc<PathBuf>, mode: Mode, action: F) -> Result<R, ApiError>
where
    F: FnOnce(Sqlite) -> Result<R, ApiError>,
    R: IntoResponse,
{
    let start = Instant::now();
    match Sqlite::open(db.as_path(), mode) {
        Ok(s) => {
            let res = action(s);
            let duration = start.elapsed();
            tracing::info!("DB query time: {:?}", duration);
            res
        }
        Err(e) => {
            tracing::error!("{e}");
            Err(ApiError::internal(&e))
        }
    }
}
