//! Error types for license reconciliation
//!
//! `Display` strings double as the human-readable messages shown to whoever
//! submitted the form, so they are written as sentences.

use thiserror::Error;

pub const MSG_KEY_REQUIRED: &str = "The license key field is required.";
pub const MSG_KEY_NOT_FOUND: &str = "License key not found.";
pub const MSG_UNKNOWN: &str = "Unknown error occurred.";
pub const MSG_TRY_AGAIN: &str = "Unknown error occurred, Please try again.";
pub const MSG_NONCE_FAILED: &str = "Nonce verification failed.";
pub const MSG_NO_PERMISSION: &str = "You don't have permission to manage license.";

pub const MSG_ACTIVATED: &str = "License activated successfully.";
pub const MSG_DEACTIVATED: &str = "License deactivated successfully.";
pub const MSG_REFRESHED: &str = "License refreshed successfully.";

#[derive(Debug, Error)]
pub enum LicenseError {
    /// Required input missing; rejected before any remote call.
    #[error("{0}")]
    Validation(String),

    /// The remote call could not complete.
    #[error("Could not reach the licensing server: {0}")]
    Transport(String),

    /// The remote call completed but reported failure.
    #[error("{0}")]
    RemoteRejection(String),

    /// The operation needs a stored key and there is none.
    #[error("{0}")]
    NotFound(String),

    /// The caller failed the host's nonce or capability check.
    #[error("{0}")]
    Unauthorized(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LicenseError {
    /// True for persistence and configuration failures, which are not
    /// converted into a form message.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LicenseError::Storage(_) | LicenseError::Serialization(_) | LicenseError::Config(_)
        )
    }

    /// Rejection carrying the remote message, or the generic one when the
    /// remote did not supply any.
    pub fn rejection(message: Option<String>) -> Self {
        match message {
            Some(m) if !m.trim().is_empty() => LicenseError::RemoteRejection(m),
            _ => LicenseError::RemoteRejection(MSG_UNKNOWN.to_string()),
        }
    }
}

impl From<std::io::Error> for LicenseError {
    fn from(e: std::io::Error) -> Self {
        LicenseError::Storage(e.to_string())
    }
}

pub type LicenseResult<T> = Result<T, LicenseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_falls_back_to_generic_message() {
        assert_eq!(LicenseError::rejection(None).to_string(), MSG_UNKNOWN);
        assert_eq!(
            LicenseError::rejection(Some("  ".into())).to_string(),
            MSG_UNKNOWN
        );
        assert_eq!(
            LicenseError::rejection(Some("Key expired".into())).to_string(),
            "Key expired"
        );
    }

    #[test]
    fn only_persistence_errors_are_fatal() {
        assert!(LicenseError::Storage("disk full".into()).is_fatal());
        assert!(LicenseError::Config("blank slug".into()).is_fatal());
        assert!(!LicenseError::Transport("timeout".into()).is_fatal());
        assert!(!LicenseError::Validation(MSG_KEY_REQUIRED.into()).is_fatal());
        assert!(!LicenseError::NotFound(MSG_KEY_NOT_FOUND.into()).is_fatal());
    }
}
