//! Common error handling utilities for Skribe
//!
//! Standardized error types, error codes and reporting helpers used across
//! the client crates.
//!
//! # Error Categories
//!
//! - **NetworkError** / **WebSocketError**: transport failures
//! - **HttpError** / **NotFound**: the backend rejected a request
//! - **ValidationError** / **SerializationError**: bad input or payloads
//! - **RecordingError**: audio capture device failures
//! - **ConfigError**: missing or malformed configuration
//!
//! Views never surface a failure as a panic: they catch it, report it with an
//! [`ErrorContext`] and keep their previous state.
//!
//! # Example
//!
//! ```rust
//! use error_common::{log_and_continue, ErrorContext, SkribeError};
//!
//! fn fetch() -> Result<String, SkribeError> {
//!     Err(SkribeError::NotFound("session 42".into()))
//! }
//!
//! let ctx = ErrorContext::new("get_session").with_session_id("42");
//! let detail = log_and_continue(&ctx, fetch());
//! assert!(detail.is_none());
//! ```

pub mod types;
pub mod context;
pub mod codes;
pub mod reporting;

pub use types::*;
pub use context::*;
pub use reporting::*;
