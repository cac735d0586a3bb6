use figment::Figment;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::providers::ConfigSource;
use crate::validation::Validate;

/// Layered configuration builder
#[derive(Debug, Clone, Default)]
pub struct ConfigEngine {
    sources: Vec<ConfigSource>,
}

impl ConfigEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    /// Merge every source into a single figment
    pub fn figment(&self) -> Result<Figment> {
        self.sources
            .iter()
            .try_fold(Figment::new(), |figment, source| source.merge_into(figment))
    }

    /// Extract and validate a typed configuration
    pub fn extract<T>(&self) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        let config: T = self.figment()?.extract()?;
        config.validate()?;
        tracing::debug!(sources = self.sources.len(), "Configuration loaded");
        Ok(config)
    }
}
