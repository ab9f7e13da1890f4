use crumbtrail_ingest::IngestError;
use thiserror::Error;

/// Infrastructure failures. Problems found in scanned content are never
/// errors; they are reported as diagnostics inside the report.
#[derive(Error, Debug)]
pub enum CrumbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] IngestError),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CrumbError>;
