use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kernel::ErrorReply;
use thiserror::Error;

/// Failure surface of the record service.
///
/// Only the missing-record case is distinguished; everything else is a
/// generic failure carrying the underlying message verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Report not found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: ToString>(e: &E) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::QueryReturnedNoRows => ApiError::NotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorReply {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
