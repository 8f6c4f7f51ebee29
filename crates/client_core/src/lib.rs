use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::protocol::{ClassificationResult, ClassifyResponse, CLASSIFY_PATH, FILE_FIELD};
use tracing::{debug, info, warn};

pub mod config;
pub mod error;
pub mod logging;

pub use config::Settings;
pub use error::UploadError;

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Pre-flight size gate. Sizes equal to the limit are accepted.
pub fn check_upload_size(size_bytes: u64, limit_bytes: u64) -> Result<(), UploadError> {
    if size_bytes > limit_bytes {
        return Err(UploadError::FileTooLarge {
            size_bytes,
            limit_bytes,
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Memory(Arc<Vec<u8>>),
}

/// A file chosen by the user. Bytes from disk are only read once the upload is under way.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    source: FileSource,
}

impl SelectedFile {
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self {
            mime_type: guess_mime_type(&file_name),
            file_name,
            size_bytes: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        Self {
            mime_type: guess_mime_type(&file_name),
            file_name,
            size_bytes: bytes.len() as u64,
            source: FileSource::Memory(Arc::new(bytes)),
        }
    }

    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path).await,
            FileSource::Memory(bytes) => Ok(bytes.as_ref().clone()),
        }
    }
}

fn guess_mime_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, file: &SelectedFile) -> Result<ClassificationResult, UploadError>;
}

/// Talks to the backend's `POST /classify` endpoint.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    http: Client,
    server_url: String,
    max_upload_bytes: u64,
}

impl HttpClassifier {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: impl Into<String>) -> Self {
        Self {
            http,
            server_url: server_url.into().trim_end_matches('/').to_string(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.server_url.clone()).with_max_upload_bytes(settings.max_upload_bytes)
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}{CLASSIFY_PATH}", self.server_url)
    }

    fn build_form(file: &SelectedFile, bytes: Vec<u8>) -> Result<Form, UploadError> {
        let part = Part::bytes(bytes)
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)?;
        Ok(Form::new().part(FILE_FIELD, part))
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, file: &SelectedFile) -> Result<ClassificationResult, UploadError> {
        check_upload_size(file.size_bytes, self.max_upload_bytes)?;

        let bytes = file.read_bytes().await?;
        let form = Self::build_form(file, bytes)?;
        info!(
            file = %file.file_name,
            size_bytes = file.size_bytes,
            endpoint = %self.endpoint(),
            "uploading image for classification"
        );

        let response = self.http.post(self.endpoint()).multipart(form).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, body_len = body.len(), "classify response received");

        match ClassifyResponse::decode(&body)? {
            ClassifyResponse::Classified(result) => Ok(result),
            ClassifyResponse::Rejected(api_error) => {
                warn!(%status, error = %api_error.error, "backend rejected classification");
                Err(UploadError::BackendReported(api_error.error))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
