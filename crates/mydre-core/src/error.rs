//! Error types module
//!
//! All errors are unified under the `AppError` enum: validation errors
//! (rejected locally, before anything is sent), API errors (non-2xx
//! responses, carrying the server's detail when the body parses as JSON),
//! and internal errors. No variant is fatal to a session; callers keep
//! their state and retry user-driven.

use std::io;

use crate::validation::MIN_PIN_LEN;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("PIN must be at least {MIN_PIN_LEN} characters long (got {len})")]
    PinTooShort { len: usize },

    #[error("Duplicate workspace names: {}", .0.join(", "))]
    DuplicateWorkspaces(Vec<String>),

    #[error("No workspaces to combine")]
    EmptyCollection,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("A PIN prompt is already open for {0}")]
    PromptBusy(String),

    #[error("API request failed with status {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("Decryption failed: {0}")]
    Decrypt(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for errors a user can fix by retrying the same operation
    /// (wrong PIN, transient server failure). Validation errors are not
    /// retryable as-is; the input has to change first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Api { .. }
                | AppError::UploadRejected(_)
                | AppError::Decrypt(_)
                | AppError::Internal(_)
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_too_short_names_minimum() {
        let err = AppError::PinTooShort { len: 4 };
        let msg = err.to_string();
        assert!(msg.contains('6'));
        assert!(msg.contains('4'));
        assert!(!err.is_retryable());
    }

    #[test]
    fn duplicate_workspaces_lists_names() {
        let err = AppError::DuplicateWorkspaces(vec!["Team".into(), "Lab".into()]);
        assert_eq!(
            err.to_string(),
            "Duplicate workspace names: Team, Lab"
        );
    }

    #[test]
    fn api_errors_are_retryable() {
        let err = AppError::Api {
            status: 400,
            detail: "Invalid PIN or corrupted file".into(),
        };
        assert!(err.is_retryable());
        assert!(err.to_string().contains("400"));
        assert!(AppError::UploadRejected("quota exceeded".into()).is_retryable());
    }

    #[test]
    fn json_errors_become_invalid_input() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err = AppError::from(parse_err);
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
