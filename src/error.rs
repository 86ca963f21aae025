//! Error types for Rentvault.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=init, 3=not_found, 4=validation, etc.)
//! - Operation wrapping (`Failed to <action> <entity>: <cause>`) that keeps the code
//! - Structured JSON output for piped / non-TTY consumers

use crate::model::Entity;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Rentvault operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes, one per failure category.
///
/// Callers match on the code, never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Bad password, unwritable path, or store used before initialization.
    Initialization,
    /// get/update/delete on a missing id.
    NotFound,
    /// Required field missing or value out of range.
    Validation,
    /// Ingestion path unreadable.
    FileRead,
    /// Underlying file/disk/engine failure.
    StorageIo,
    /// Remote PDF combination service failure.
    PdfService,
    /// Configuration could not be resolved.
    Config,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Initialization => "INITIALIZATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::FileRead => "FILE_READ_ERROR",
            Self::StorageIo => "STORAGE_IO_ERROR",
            Self::PdfService => "PDF_SERVICE_ERROR",
            Self::Config => "CONFIG_ERROR",
        }
    }

    /// Category-based exit code (2-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Initialization => 2,
            Self::NotFound => 3,
            Self::Validation => 4,
            Self::FileRead => 5,
            Self::StorageIo => 6,
            Self::PdfService => 7,
            Self::Config => 8,
        }
    }

    /// Whether the caller can succeed by retrying with corrected input.
    ///
    /// Nothing is retried automatically; this only drives UI prompts.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Initialization | Self::Validation | Self::FileRead)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Rentvault operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Store not initialized: unlock it with the user password first")]
    NotInitialized,

    #[error("Cannot open store at {}: {reason}", path.display())]
    Initialization { path: PathBuf, reason: String },

    #[error("{} not found: {id}", entity.label())]
    NotFound { entity: Entity, id: i64 },

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Cannot read file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Background(String),

    #[error("PDF service error: {0}")]
    PdfService(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to {action} {entity}: {source}")]
    Operation {
        action: &'static str,
        entity: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Shorthand for a validation failure on one field.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Wrap this error with the facade's `Failed to <action> <entity>` context.
    #[must_use]
    pub fn during(self, action: &'static str, entity: &'static str) -> Self {
        Self::Operation {
            action,
            entity,
            source: Box::new(self),
        }
    }

    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized | Self::Initialization { .. } => ErrorCode::Initialization,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Validation { .. } => ErrorCode::Validation,
            Self::FileRead { .. } => ErrorCode::FileRead,
            Self::Database(_) | Self::Io(_) | Self::Json(_) | Self::Background(_) => {
                ErrorCode::StorageIo
            }
            Self::PdfService(_) => ErrorCode::PdfService,
            Self::Config(_) => ErrorCode::Config,
            Self::Operation { source, .. } => source.error_code(),
        }
    }

    /// The innermost error, skipping facade operation wrappers.
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Self::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for humans.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self.root() {
            Self::NotInitialized => {
                Some("Run `rv init` (or pass --password) to unlock the store".to_string())
            }
            Self::Initialization { path, .. } => Some(format!(
                "Check the password for this user and that {} is writable. \
                 A wrong password never modifies the existing file.",
                path.display()
            )),
            Self::NotFound { entity, .. } => Some(format!(
                "Use `rv {} list` to see existing ids.",
                entity.command()
            )),
            Self::Validation { field, .. } => match *field {
                "lease_type" => Some("Valid lease types: month-to-month, annual".to_string()),
                "document_type" => {
                    Some("Valid document types: Personal, Listing, General, Other".to_string())
                }
                "source" => {
                    Some("Valid income sources: Employment, Self-Employed, Other".to_string())
                }
                "credit_score_min" => Some("Credit scores range from 300 to 850".to_string()),
                _ => None,
            },
            Self::FileRead { .. } => {
                Some("Check that the file exists and is readable by this user".to_string())
            }
            Self::PdfService(msg) if msg.contains("Authentication") => {
                Some("Sign in again to refresh the access token".to_string())
            }
            _ => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_keeps_code_of_cause() {
        let err = Error::NotFound {
            entity: Entity::Listing,
            id: 7,
        }
        .during("update", "listing");

        assert_eq!(err.error_code(), ErrorCode::NotFound);
        assert_eq!(err.to_string(), "Failed to update listing: Listing not found: 7");
        assert!(matches!(err.root(), Error::NotFound { id: 7, .. }));
    }

    #[test]
    fn test_not_initialized_is_initialization_code() {
        assert_eq!(Error::NotInitialized.error_code(), ErrorCode::Initialization);
        assert_eq!(Error::NotInitialized.exit_code(), 2);
    }

    #[test]
    fn test_engine_errors_are_storage_io() {
        let err = Error::from(rusqlite::Error::InvalidQuery);
        assert_eq!(err.error_code(), ErrorCode::StorageIo);
        assert!(std::error::Error::source(&err.during("get", "document")).is_some());
    }

    #[test]
    fn test_structured_json() {
        let err = Error::validation("lease_type", "unknown value 'weekly'");
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["retryable"], true);
        assert_eq!(json["error"]["exit_code"], 4);
        assert!(json["error"]["hint"].as_str().unwrap().contains("month-to-month"));
    }
}
