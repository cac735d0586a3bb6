use error_common::{Result, SkribeError};
use std::io::IsTerminal;
use tracing_subscriber::{fmt, fmt::time::ChronoUtc, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggerConfig;

/// Build the filter: `RUST_LOG` wins, otherwise the configured level for our
/// crates and `warn` for the HTTP stack.
pub fn env_filter(config: &LoggerConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.log_level;
        format!(
            "skribe={level},skribe_client={level},skribe_cli={level},config_engine={level},error_common={level},reqwest=warn,hyper=warn,tungstenite=warn",
        )
        .into()
    })
}

/// Install the global tracing subscriber. Logs go to stderr so command output
/// on stdout stays clean.
pub fn init_tracing(config: &LoggerConfig) -> Result<()> {
    let filter = env_filter(config);

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .try_init()
    } else {
        let use_colors = std::env::var("NO_COLOR").is_err() && std::io::stderr().is_terminal();
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::new("%H:%M:%S%.3f".to_string()))
                    .with_ansi(use_colors)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| SkribeError::ConfigError(format!("Failed to install tracing subscriber: {}", e)))
}
