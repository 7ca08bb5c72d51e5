//! # Error Types
//!
//! Structured error types for diag_core. Every failure the client can hit
//! falls into one of three classes that decide what the user is shown:
//!
//! - **Validation**: nothing selected, handled locally with no network call
//! - **Application**: the server answered but reported a non-success status
//! - **Transport**: the request was rejected or the response was unreadable
//!
//! Preview and configuration failures never reach the results region; they
//! are reported to the caller and logged.
//!
//! ## Example
//!
//! ```rust
//! use diag_core::errors::{DiagError, ErrorClass};
//!
//! let error = DiagError::transport("connection refused");
//! assert_eq!(error.class(), ErrorClass::Transport);
//! assert_eq!(
//!     error.user_message(),
//!     "A network error occurred. Is the server running?"
//! );
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for diag_core operations
pub type DiagResult<T> = Result<T, DiagError>;

/// Message shown when submit is pressed with no image selected
pub const NO_FILE_MESSAGE: &str = "Please select an image file.";

/// Message shown for every transport-class failure, whatever the cause
pub const NETWORK_ERROR_MESSAGE: &str = "A network error occurred. Is the server running?";

/// Fallback when the server reports failure without an `error` field
pub const UNKNOWN_SERVER_ERROR: &str = "Unknown server error";

/// Which user-visible category an error belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Validation,
    Application,
    Transport,
    /// Preview and configuration errors; never shown in the results region
    Local,
}

/// Structured error type for client operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum DiagError {
    /// Submit was triggered without a selected file
    #[error("No file selected")]
    NoFileSelected,

    /// The server reported a non-success status
    #[error("Server error: {message}")]
    Server { message: String },

    /// The request never produced a response (unreachable, refused, TLS, ...)
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    /// A response arrived but could not be interpreted
    #[error("Invalid response: {reason}")]
    InvalidResponse { reason: String },

    /// The selected file could not be read
    #[error("File error: could not read '{path}' - {reason}")]
    FileRead { path: String, reason: String },

    /// The selected file is not a displayable image
    #[error("Unsupported image: {reason}")]
    UnsupportedImage { reason: String },

    /// Configuration could not be loaded or saved
    #[error("Config error: {reason}")]
    Config { reason: String },
}

impl DiagError {
    /// Create a Server error
    pub fn server(message: impl Into<String>) -> Self {
        DiagError::Server {
            message: message.into(),
        }
    }

    /// Create a Transport error
    pub fn transport(reason: impl Into<String>) -> Self {
        DiagError::Transport {
            reason: reason.into(),
        }
    }

    /// Create an InvalidResponse error
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        DiagError::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Create a FileRead error
    pub fn file_read(path: impl Into<String>, reason: impl Into<String>) -> Self {
        DiagError::FileRead {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedImage error
    pub fn unsupported_image(reason: impl Into<String>) -> Self {
        DiagError::UnsupportedImage {
            reason: reason.into(),
        }
    }

    /// Create a Config error
    pub fn config(reason: impl Into<String>) -> Self {
        DiagError::Config {
            reason: reason.into(),
        }
    }

    /// The user-visible class of this error
    pub fn class(&self) -> ErrorClass {
        match self {
            DiagError::NoFileSelected => ErrorClass::Validation,
            DiagError::Server { .. } => ErrorClass::Application,
            DiagError::Transport { .. } | DiagError::InvalidResponse { .. } => {
                ErrorClass::Transport
            }
            DiagError::FileRead { .. }
            | DiagError::UnsupportedImage { .. }
            | DiagError::Config { .. } => ErrorClass::Local,
        }
    }

    /// Text safe to show to the user.
    ///
    /// Transport-class causes are replaced by a fixed message; server
    /// messages are passed through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            DiagError::NoFileSelected => NO_FILE_MESSAGE.to_string(),
            DiagError::Server { message } => message.clone(),
            DiagError::Transport { .. } | DiagError::InvalidResponse { .. } => {
                NETWORK_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            DiagError::NoFileSelected => "NO_FILE_SELECTED",
            DiagError::Server { .. } => "SERVER_ERROR",
            DiagError::Transport { .. } => "TRANSPORT_ERROR",
            DiagError::InvalidResponse { .. } => "INVALID_RESPONSE",
            DiagError::FileRead { .. } => "FILE_READ",
            DiagError::UnsupportedImage { .. } => "UNSUPPORTED_IMAGE",
            DiagError::Config { .. } => "CONFIG_ERROR",
        }
    }
}

impl From<reqwest::Error> for DiagError {
    fn from(e: reqwest::Error) -> Self {
        DiagError::transport(e.to_string())
    }
}

impl From<serde_json::Error> for DiagError {
    fn from(e: serde_json::Error) -> Self {
        DiagError::invalid_response(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = DiagError::server("model unavailable");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: DiagError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(DiagError::NoFileSelected.error_code(), "NO_FILE_SELECTED");
        assert_eq!(DiagError::invalid_response("eof").error_code(), "INVALID_RESPONSE");
    }

    #[test]
    fn test_transport_class_hides_cause() {
        let refused = DiagError::transport("connection refused (os error 111)");
        let garbled = DiagError::invalid_response("expected value at line 1 column 1");
        assert_eq!(refused.user_message(), NETWORK_ERROR_MESSAGE);
        assert_eq!(garbled.user_message(), NETWORK_ERROR_MESSAGE);
        assert_eq!(garbled.class(), ErrorClass::Transport);
    }

    #[test]
    fn test_server_message_is_verbatim() {
        let error = DiagError::server("model unavailable");
        assert_eq!(error.class(), ErrorClass::Application);
        assert_eq!(error.user_message(), "model unavailable");
    }

    #[test]
    fn test_validation_message() {
        assert_eq!(DiagError::NoFileSelected.user_message(), NO_FILE_MESSAGE);
        assert_eq!(DiagError::NoFileSelected.class(), ErrorClass::Validation);
    }
}
