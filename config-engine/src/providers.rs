// Configuration sources (files, environment, explicit overrides)
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use figment::Figment;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// One layer of configuration. Layers are merged in the order they are added;
/// later layers win.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// YAML or TOML file that must exist
    File(PathBuf),
    /// YAML or TOML file that is skipped when absent
    OptionalFile(PathBuf),
    /// Environment variables with the given prefix, e.g. `SKRIBE_API_URL` → `api_url`
    Env(String),
    /// Explicit key/value overrides, typically from command-line flags
    Overrides(BTreeMap<String, serde_json::Value>),
}

impl ConfigSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        ConfigSource::File(path.into())
    }

    pub fn optional_file(path: impl Into<PathBuf>) -> Self {
        ConfigSource::OptionalFile(path.into())
    }

    pub fn env(prefix: impl Into<String>) -> Self {
        ConfigSource::Env(prefix.into())
    }

    /// Overrides from optional values; `None` entries are left out so they do
    /// not shadow lower layers.
    pub fn overrides<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<serde_json::Value>)>,
        K: Into<String>,
    {
        let map = values
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key.into(), v)))
            .collect();
        ConfigSource::Overrides(map)
    }

    pub(crate) fn merge_into(&self, figment: Figment) -> Result<Figment> {
        match self {
            ConfigSource::File(path) => {
                if !path.exists() {
                    return Err(ConfigError::SourceNotFound(path.clone()));
                }
                merge_file(figment, path)
            }
            ConfigSource::OptionalFile(path) => {
                if path.exists() {
                    merge_file(figment, path)
                } else {
                    tracing::debug!(path = %path.display(), "Optional configuration file absent");
                    Ok(figment)
                }
            }
            ConfigSource::Env(prefix) => Ok(figment.merge(Env::prefixed(prefix))),
            ConfigSource::Overrides(values) => Ok(figment.merge(Serialized::defaults(values.clone()))),
        }
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        "toml" => Ok(figment.merge(Toml::file(path))),
        other => Err(ConfigError::UnsupportedFormat(format!(
            "{} (extension '{}')",
            path.display(),
            other
        ))),
    }
}
