// Configuration validation
use url::Url;

use crate::error::{ConfigError, Result};

/// Implemented by configuration structs that have constraints serde cannot express
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!("'{}' must be set", field)));
    }
    Ok(())
}

/// Require `value` to be an absolute URL whose scheme is one of `schemes`
pub fn require_url_scheme(field: &str, value: &str, schemes: &[&str]) -> Result<Url> {
    require_non_empty(field, value)?;

    let url = Url::parse(value)
        .map_err(|e| ConfigError::ValidationError(format!("'{}' is not a valid URL ({}): {}", field, e, value)))?;

    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::ValidationError(format!(
            "'{}' must use one of [{}], got '{}'",
            field,
            schemes.join(", "),
            url.scheme()
        )));
    }

    Ok(url)
}
