use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ProtocolError};

pub const CLASSIFY_PATH: &str = "/classify";
pub const FILE_FIELD: &str = "file";
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecyclingInfo {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: String,
    pub confidence: f64,
    /// Base64 JPEG of the classified image.
    pub image: String,
    #[serde(default)]
    pub recycling_info: RecyclingInfo,
}

impl ClassificationResult {
    pub fn confidence_text(&self) -> String {
        format!("{}% Confidence", self.confidence)
    }

    pub fn image_data_uri(&self) -> String {
        format!("{JPEG_DATA_URI_PREFIX}{}", self.image)
    }
}

/// Extracts the base64 payload from a `data:image/jpeg;base64,` URI.
pub fn decode_jpeg_data_uri(uri: &str) -> Result<Vec<u8>, ProtocolError> {
    let payload = uri
        .strip_prefix(JPEG_DATA_URI_PREFIX)
        .ok_or(ProtocolError::Malformed("image"))?;
    Ok(STANDARD.decode(payload.trim())?)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyResponse {
    Rejected(ApiError),
    Classified(ClassificationResult),
}

#[derive(Debug, Deserialize)]
struct RawClassifyResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    recycling_info: Option<RecyclingInfo>,
}

impl ClassifyResponse {
    /// Decodes a `/classify` body regardless of HTTP status. A non-empty `error` wins.
    pub fn decode(body: &[u8]) -> Result<Self, ProtocolError> {
        let raw: RawClassifyResponse = serde_json::from_slice(body)?;

        if let Some(error) = raw.error.filter(|message| !message.is_empty()) {
            return Ok(Self::Rejected(ApiError::new(error)));
        }

        Ok(Self::Classified(ClassificationResult {
            category: raw.category.ok_or(ProtocolError::Malformed("category"))?,
            confidence: raw.confidence.ok_or(ProtocolError::Malformed("confidence"))?,
            image: raw.image.ok_or(ProtocolError::Malformed("image"))?,
            recycling_info: raw.recycling_info.unwrap_or_default(),
        }))
    }
}
