use thiserror::Error;

use crate::codes;

/// Error enum shared by every Skribe crate
#[derive(Error, Debug)]
pub enum SkribeError {
    /// WebSocket connection or framing errors
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    /// Transport-level HTTP failures (connect, DNS, TLS, timeout)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Backend answered with a non-success status
    #[error("HTTP {status}: {detail}")]
    HttpError { status: u16, detail: String },

    /// Backend answered 404 for the named resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client-side input validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Payload encoding / decoding errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Audio capture device errors
    #[error("Recording error: {0}")]
    RecordingError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SkribeError {
    /// Stable error code for this error, suitable for terminal output and log fields
    pub fn code(&self) -> &'static str {
        match self {
            Self::WebSocketError(_) => codes::transport::WEBSOCKET_FAILED,
            Self::NetworkError(_) => codes::transport::REQUEST_FAILED,
            Self::HttpError { status, .. } if *status >= 500 => codes::backend::SERVER_ERROR,
            Self::HttpError { .. } => codes::backend::REQUEST_REJECTED,
            Self::NotFound(_) => codes::backend::NOT_FOUND,
            Self::ValidationError(_) => codes::validation::INVALID_INPUT,
            Self::SerializationError(_) => codes::validation::INVALID_FORMAT,
            Self::RecordingError(_) => codes::recording::CAPTURE_FAILED,
            Self::ConfigError(_) => codes::config::INVALID_CONFIG,
            Self::InternalError(_) | Self::Other(_) => codes::internal::UNEXPECTED,
        }
    }

    /// Short category name used as a structured log field
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::WebSocketError(_) => "websocket",
            Self::NetworkError(_) => "network",
            Self::HttpError { .. } => "http",
            Self::NotFound(_) => "not_found",
            Self::ValidationError(_) => "validation",
            Self::SerializationError(_) => "serialization",
            Self::RecordingError(_) => "recording",
            Self::ConfigError(_) => "config",
            Self::InternalError(_) | Self::Other(_) => "internal",
        }
    }

    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError(_) | Self::WebSocketError(_) => true,
            Self::HttpError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for SkribeError {
    fn from(err: serde_json::Error) -> Self {
        SkribeError::SerializationError(err.to_string())
    }
}

/// Result type alias for Skribe operations
pub type Result<T> = std::result::Result<T, SkribeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_codes_split_on_server_failures() {
        let rejected = SkribeError::HttpError { status: 400, detail: "No patient summary to edit".into() };
        let failed = SkribeError::HttpError { status: 502, detail: "bad gateway".into() };

        assert_eq!(rejected.code(), codes::backend::REQUEST_REJECTED);
        assert_eq!(failed.code(), codes::backend::SERVER_ERROR);
        assert!(!rejected.is_transient());
        assert!(failed.is_transient());
    }

    #[test]
    fn test_display_includes_status_and_detail() {
        let err = SkribeError::HttpError { status: 404, detail: "Session not found".into() };
        assert_eq!(err.to_string(), "HTTP 404: Session not found");
    }

    #[test]
    fn test_serde_json_errors_convert() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: SkribeError = parse.unwrap_err().into();
        assert_eq!(err.error_type(), "serialization");
    }
}
