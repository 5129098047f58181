//! The uniform command envelope and backend error classification.
//!
//! Every command returns `{success, data}` or `{success: false, error,
//! code}`. Translation-time failures never reach the backend; backend
//! failures are classified from the status the service reported, and
//! anything unclassified passes its raw message through rather than being
//! swallowed.

use crate::backend::BackendError;
use crate::errors::TranslationError;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidRange,
    SheetNotFound,
    AuthenticationFailed,
    PermissionDenied,
    ResourceNotFound,
    InvalidArgument,
    QuotaExceeded,
    TransientNetwork,
    #[strum(serialize = "BACKEND_ERROR")]
    Backend,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        self.into()
    }
}

/// Classify a failure into a user-facing kind and message. The message must
/// be enough to diagnose the category on its own: "not shared with this
/// identity" and "does not exist" are different failures.
pub fn classify(error: &anyhow::Error) -> (ErrorKind, String) {
    if let Some(translation) = error.downcast_ref::<TranslationError>() {
        let kind = match translation {
            TranslationError::InvalidRange { .. } => ErrorKind::InvalidRange,
            TranslationError::SheetNotFound { .. } => ErrorKind::SheetNotFound,
            TranslationError::ValueShapeMismatch { .. } => ErrorKind::InvalidArgument,
            TranslationError::ChartNotFound { .. } => ErrorKind::ResourceNotFound,
        };
        return (kind, translation.to_string());
    }

    if let Some(backend) = error.downcast_ref::<BackendError>() {
        return match backend {
            BackendError::Status { status, message } => match status {
                401 => (
                    ErrorKind::AuthenticationFailed,
                    format!("backend rejected credentials: {message}"),
                ),
                403 => (
                    ErrorKind::PermissionDenied,
                    format!(
                        "permission denied (the resource exists but is not shared with this identity): {message}"
                    ),
                ),
                404 => (
                    ErrorKind::ResourceNotFound,
                    format!("resource does not exist at the backend: {message}"),
                ),
                400 => (
                    ErrorKind::InvalidArgument,
                    format!("backend rejected the request as invalid: {message}"),
                ),
                429 => (
                    ErrorKind::QuotaExceeded,
                    format!("backend rate limit hit: {message}"),
                ),
                502 | 503 | 504 => (
                    ErrorKind::TransientNetwork,
                    format!("backend temporarily unavailable (status {status}): {message}"),
                ),
                _ => (
                    ErrorKind::Backend,
                    format!("backend error (status {status}): {message}"),
                ),
            },
            BackendError::Transport { message, timed_out } => (
                ErrorKind::TransientNetwork,
                if *timed_out {
                    format!("backend request timed out: {message}")
                } else {
                    format!("backend unreachable: {message}")
                },
            ),
        };
    }

    (ErrorKind::Backend, error.to_string())
}

/// Uniform command output. `success: false` implies `data` is absent and
/// `error` carries a human-readable message.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CommandEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl CommandEnvelope {
    pub fn success<T: Serialize>(data: T) -> anyhow::Result<Self> {
        Ok(Self {
            success: true,
            data: Some(serde_json::to_value(data)?),
            error: None,
            code: None,
        })
    }

    pub fn failure(error: &anyhow::Error) -> Self {
        let (kind, message) = classify(error);
        Self {
            success: false,
            data: None,
            error: Some(message),
            code: Some(kind.code().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_errors_classify_before_backend_kinds() {
        let error: anyhow::Error = TranslationError::invalid_range("A", "missing row number").into();
        let (kind, message) = classify(&error);
        assert_eq!(kind, ErrorKind::InvalidRange);
        assert!(message.contains("'A'"));
    }

    #[test]
    fn permission_and_missing_are_distinguishable_from_message_alone() {
        let denied: anyhow::Error = BackendError::status(403, "caller lacks access").into();
        let missing: anyhow::Error = BackendError::status(404, "spreadsheet gone").into();
        let (_, denied_msg) = classify(&denied);
        let (_, missing_msg) = classify(&missing);
        assert!(denied_msg.contains("not shared"));
        assert!(missing_msg.contains("does not exist"));
    }

    #[test]
    fn unclassified_failures_keep_their_raw_message() {
        let error = anyhow::anyhow!("socket surprise");
        let (kind, message) = classify(&error);
        assert_eq!(kind, ErrorKind::Backend);
        assert_eq!(message, "socket surprise");
    }

    #[test]
    fn error_codes_are_stable_tokens() {
        assert_eq!(ErrorKind::InvalidRange.code(), "INVALID_RANGE");
        assert_eq!(ErrorKind::AuthenticationFailed.code(), "AUTHENTICATION_FAILED");
        assert_eq!(ErrorKind::Backend.code(), "BACKEND_ERROR");
    }

    #[test]
    fn failure_envelope_shape() {
        let error: anyhow::Error = BackendError::status(429, "slow down").into();
        let envelope = CommandEnvelope::failure(&error);
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.code.as_deref(), Some("QUOTA_EXCEEDED"));
    }
}
