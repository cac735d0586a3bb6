use config_engine::{require_url_scheme, ConfigEngine, ConfigSource, Validate};
use error_common::Result;
use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix, e.g. `SKRIBE_API_URL`
pub const ENV_PREFIX: &str = "SKRIBE_";

/// Configuration file picked up from the working directory when no
/// `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "skribe.yaml";

/// Client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `http://localhost:8000`
    pub api_url: String,
    /// WebSocket base URL, e.g. `ws://localhost:8000`
    pub ws_url: String,
    /// Per-request timeout; unset means the platform default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Extra attempts for idempotent GETs
    #[serde(default)]
    pub get_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default = "default_redact_logs")]
    pub redact_logs: bool,
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_redact_logs() -> bool {
    true
}

impl Validate for ClientConfig {
    fn validate(&self) -> config_engine::Result<()> {
        require_url_scheme("api_url", &self.api_url, &["http", "https"])?;
        require_url_scheme("ws_url", &self.ws_url, &["ws", "wss"])?;
        Ok(())
    }
}

/// Values supplied on the command line; `None` leaves lower layers in place
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub ws_url: Option<String>,
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

impl ConfigOverrides {
    fn into_source(self) -> ConfigSource {
        ConfigSource::overrides([
            ("api_url", self.api_url.map(Into::into)),
            ("ws_url", self.ws_url.map(Into::into)),
            ("log_level", self.log_level.map(Into::into)),
            ("json_logs", self.json_logs.map(Into::into)),
        ])
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, ws_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ws_url: ws_url.into(),
            request_timeout_secs: None,
            get_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            log_level: default_log_level(),
            json_logs: false,
            redact_logs: default_redact_logs(),
        }
        .normalized()
    }

    /// Load from an explicit file (which must exist) or `skribe.yaml` when
    /// present, then `SKRIBE_*` environment variables, then `overrides`.
    pub fn load(config_file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let file = match config_file {
            Some(path) => ConfigSource::file(path),
            None => ConfigSource::optional_file(DEFAULT_CONFIG_FILE),
        };

        let config: ClientConfig = ConfigEngine::new()
            .add_source(file)
            .add_source(ConfigSource::env(ENV_PREFIX))
            .add_source(overrides.into_source())
            .extract()?;

        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        self.api_url = self.api_url.trim().trim_end_matches('/').to_string();
        self.ws_url = self.ws_url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Full URL of the transcription socket
    pub fn transcription_ws_url(&self) -> String {
        format!("{}/ws/transcription", self.ws_url)
    }

    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            log_level: self.log_level.clone(),
            json: self.json_logs,
            redaction_enabled: self.redact_logs,
        }
    }
}
