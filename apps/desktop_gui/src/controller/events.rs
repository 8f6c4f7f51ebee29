//! UI/backend events and error modeling for the desktop GUI controller.

use client_core::UploadError;
use shared::protocol::ClassificationResult;

use crate::controller::upload::CycleId;

pub enum UiEvent {
    Info(String),
    Error(UiError),
    ClassificationFinished {
        cycle: CycleId,
        outcome: Result<ClassificationResult, UploadError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Backend,
    Transport,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Upload,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    /// Worker and file-access failures. Upload outcomes go through `from_upload_error`.
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("disconnect")
            || message_lower.contains("runtime")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_upload_error(err: &UploadError) -> Self {
        let category = match err {
            UploadError::FileTooLarge { .. } => UiErrorCategory::Validation,
            UploadError::BackendReported(_) => UiErrorCategory::Backend,
            UploadError::TransportOrParse(_) => UiErrorCategory::Transport,
        };
        Self {
            category,
            context: UiErrorContext::Upload,
            message: err.user_message(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_startup_failures_are_transport_errors() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "backend worker startup failure: failed to build runtime: os error 24",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert_eq!(err.context(), UiErrorContext::BackendStartup);
    }

    #[test]
    fn upload_errors_keep_their_alert_text() {
        let err = UiError::from_upload_error(&UploadError::BackendReported(
            "Processing error: model not loaded".into(),
        ));
        assert_eq!(err.category(), UiErrorCategory::Backend);
        assert_eq!(err.message(), "Error: Processing error: model not loaded");
    }

    #[test]
    fn unrecognized_messages_are_unknown() {
        let err = UiError::from_message(UiErrorContext::General, "something odd");
        assert_eq!(err.category(), UiErrorCategory::Unknown);
    }

    #[test]
    fn file_open_failures_are_unknown_not_validation() {
        let err = UiError::from_message(
            UiErrorContext::General,
            "could not open /tmp/no file here.jpg: No such file or directory (os error 2)",
        );
        assert_eq!(err.category(), UiErrorCategory::Unknown);
        assert_eq!(err.context(), UiErrorContext::General);
    }
}
