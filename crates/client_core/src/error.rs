use thiserror::Error;

use crate::MAX_UPLOAD_BYTES;

pub const FILE_TOO_LARGE_MESSAGE: &str =
    "File size too large. Please upload an image smaller than 10MB.";
pub const RETRY_MESSAGE: &str = "An error occurred while processing your image. Please try again.";

/// Ways an upload cycle can fail. Each maps to one blocking user alert.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("file is {size_bytes} bytes, limit is {limit_bytes} bytes")]
    FileTooLarge { size_bytes: u64, limit_bytes: u64 },
    #[error("backend reported: {0}")]
    BackendReported(String),
    #[error("transport or decode failure: {0}")]
    TransportOrParse(String),
}

impl UploadError {
    pub fn user_message(&self) -> String {
        match self {
            UploadError::FileTooLarge { limit_bytes, .. } => too_large_message(*limit_bytes),
            UploadError::BackendReported(message) => format!("Error: {message}"),
            UploadError::TransportOrParse(_) => RETRY_MESSAGE.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, UploadError::TransportOrParse(_))
    }
}

/// The stock wording for the default limit, otherwise the configured limit in the largest whole unit.
fn too_large_message(limit_bytes: u64) -> String {
    if limit_bytes == MAX_UPLOAD_BYTES {
        return FILE_TOO_LARGE_MESSAGE.to_string();
    }
    let limit = if limit_bytes >= 1024 * 1024 && limit_bytes % (1024 * 1024) == 0 {
        format!("{}MB", limit_bytes / (1024 * 1024))
    } else if limit_bytes >= 1024 && limit_bytes % 1024 == 0 {
        format!("{}KB", limit_bytes / 1024)
    } else {
        format!("{limit_bytes} bytes")
    };
    format!("File size too large. Please upload an image smaller than {limit}.")
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        UploadError::TransportOrParse(err.to_string())
    }
}

impl From<shared::error::ProtocolError> for UploadError {
    fn from(err: shared::error::ProtocolError) -> Self {
        UploadError::TransportOrParse(err.to_string())
    }
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        UploadError::TransportOrParse(format!("failed to read selected file: {err}"))
    }
}
