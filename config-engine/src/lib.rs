//! Layered configuration for the Skribe client
//!
//! Configuration is merged from several sources, later ones winning:
//! - **Local Files**: YAML or TOML
//! - **Environment Variables**: prefixed, e.g. `SKRIBE_API_URL`
//! - **Overrides**: values supplied on the command line
//!
//! The merged result is deserialized with serde and then checked through the
//! [`Validate`] trait, so URL schemes and required fields fail early with a
//! readable message.
//!
//! # Example
//!
//! ```rust,no_run
//! use config_engine::{ConfigEngine, ConfigSource, Validate, require_non_empty};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct AppConfig {
//!     api_url: String,
//! }
//!
//! impl Validate for AppConfig {
//!     fn validate(&self) -> config_engine::Result<()> {
//!         require_non_empty("api_url", &self.api_url)
//!     }
//! }
//!
//! let config: AppConfig = ConfigEngine::new()
//!     .add_source(ConfigSource::optional_file("skribe.yaml"))
//!     .add_source(ConfigSource::env("SKRIBE_"))
//!     .extract()?;
//! # Ok::<(), config_engine::ConfigError>(())
//! ```

pub mod engine;
pub mod providers;
pub mod validation;
pub mod error;

pub use engine::*;
pub use providers::*;
pub use validation::*;
pub use error::*;
