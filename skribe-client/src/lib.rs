//! Skribe clinical documentation client
//!
//! Typed access to the Skribe backend plus the state behind each screen of
//! the dashboard. All clinical work (transcription, SOAP note generation,
//! summaries, compliance scoring, QR codes) happens on the backend; this
//! crate records audio, sends requests and merges the results.
//!
//! # Screens
//!
//! - **Dashboard**: [`Dashboard`], [`DashboardStats`] and [`filter_sessions`]
//! - **New session**: [`NewSessionForm`], which yields the [`Route`] to open
//! - **Live session**: [`LiveSession`] with its recorder, WebSocket
//!   connection and four [`Tab`]s
//!
//! # Transport
//!
//! REST calls go through [`ApiClient`] (behind the [`SessionApi`] trait so
//! views can run against fakes). Generation requests and their results travel
//! over one WebSocket per live session as [`ClientMessage`] /
//! [`ServerMessage`] frames.
//!
//! # Example
//!
//! ```rust,no_run
//! use skribe_client::{ApiClient, ClientConfig, ConfigOverrides, FileCapture, LiveSession, SessionApi};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> error_common::Result<()> {
//! let config = ClientConfig::load(None, ConfigOverrides::default())?;
//! let api: Arc<dyn SessionApi> = Arc::new(ApiClient::new(&config)?);
//!
//! let capture = Box::new(FileCapture::new("visit.webm"));
//! let mut session = LiveSession::connect(&config, "3f2c9a", api, capture).await?;
//!
//! session.start_recording();
//! session.stop_recording().await;
//! session
//!     .wait_for(Duration::from_secs(120), |m| m.kind() == "transcript_complete")
//!     .await?;
//! println!("{}", session.current_transcript());
//! session.close().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod dashboard;
pub mod format;
pub mod live;
#[cfg(feature = "microphone")]
pub mod microphone;
pub mod models;
pub mod new_session;
pub mod protocol;
pub mod recording;
pub mod routes;
pub mod transport;

pub use api::{ApiClient, ListQuery, SessionApi};
pub use config::{ClientConfig, ConfigOverrides};
pub use dashboard::{filter_sessions, Dashboard, DashboardStats};
pub use format::{format_date, format_timestamp, generate_session_id};
pub use live::{LiveSession, Tab};
#[cfg(feature = "microphone")]
pub use microphone::MicrophoneCapture;
pub use models::*;
pub use new_session::NewSessionForm;
pub use protocol::{ClientMessage, ServerMessage};
pub use recording::{AudioCapture, ChunkSink, FileCapture, NoCapture, Recorder};
pub use routes::Route;
pub use transport::{MessageTransport, WsTransport};
