//! HIPAA-minded logging for the Skribe client
//!
//! Sessions carry patient and doctor names, transcripts and summaries. None of
//! that may reach a log line verbatim, so every crate logs through
//! [`PiiRedactor`] (directly or with the `redacted_*!` macros) and installs the
//! subscriber with [`init_tracing`].
//!
//! # Detected Data Types
//!
//! - **Registered names**: doctor / patient of the current session
//! - **Email Addresses**: `user@example.com` → `EMAIL[hash]`
//! - **Phone Numbers**: `(555) 123-4567` → `PHONE[hash]`
//! - **SSN**: `123-45-6789` → `SSN[hash]`
//! - **Medical Record Numbers**: `MRN123456` → `MRN[hash]`
//!
//! # Example
//!
//! ```rust
//! use logger_redacted::{redacted_info, PiiRedactor};
//!
//! let redactor = PiiRedactor::default().with_names(["Jane Doe"]);
//! redacted_info!(redactor, "Loaded session for {}", "Jane Doe");
//! ```

pub mod redactor;
pub mod macros;
pub mod config;
pub mod init;

pub use redactor::*;
pub use config::*;
pub use init::*;
