use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body the classification backend sends alongside a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("classification response is missing `{0}`")]
    Malformed(&'static str),
    #[error("image payload is not valid base64: {0}")]
    InvalidImage(#[from] base64::DecodeError),
}
