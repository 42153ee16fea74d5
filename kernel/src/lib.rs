#![warn(clippy::unwrap_in_result)]
#![warn(clippy::unwrap_used)]

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Represents a single report record.
///
/// A report is a person record with a few scalar fields and an optional
/// file attachment. The attachment itself lives in blob storage; the
/// record only carries a reference to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Report {
    /// Server-generated unique identifier
    pub id: String,
    /// Name of the person who sent the report
    pub sender_name: String,
    /// Age of the sender in years
    pub age: i64,
    /// Occupation of the sender
    pub job: String,
    /// Reference to the stored attachment, `null` when nothing is attached
    pub file_url: Option<String>,
    /// Base64-encoded attachment content, populated only on detail reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Confirmation returned by a successful delete operation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Deleted {
    /// Human readable confirmation text
    pub message: String,
}

/// Uniform failure body carrying the underlying error text.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorReply {
    /// What went wrong
    pub error: String,
}
