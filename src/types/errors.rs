use std::path::PathBuf;
use thiserror::Error;

/// Error taxonomy for the discovery -> hash -> parse -> dedup -> pack pipeline.
///
/// Per-file and per-record failures are isolated to their unit of work; nothing
/// here cancels sibling units.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Archive not found: {0}")]
    ArchiveNotFound(PathBuf),
    #[error("Unrecognized descriptor format")]
    UnrecognizedDescriptorFormat,
    #[error("Hashing failed after {attempts} attempts: {source}")]
    HashUnavailable {
        attempts: u32,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Remote catalog unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CoreError {
    fn from(error: reqwest::Error) -> Self {
        CoreError::RemoteUnavailable(error.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
