//! Settings validation

use crate::config::types::FileSettings;
use crate::error::{ConfigError, ConfigResult};
use url::Url;

/// Validate a parsed settings file
pub fn validate_settings(settings: &FileSettings) -> ConfigResult<()> {
    if let Some(url) = &settings.api_url {
        validate_url("api_url", url)?;
    }
    if let Some(url) = &settings.storage_url {
        validate_url("storage_url", url)?;
    }
    if let Some(url) = settings.auth.as_ref().and_then(|auth| auth.url.as_ref()) {
        validate_url("auth.url", url)?;
    }
    if settings.timeout == Some(0) {
        return Err(ConfigError::Invalid(
            "timeout must be a positive number of seconds".to_string(),
        ));
    }
    Ok(())
}

/// An endpoint must be an absolute http(s) URL
pub fn validate_url(key: &str, value: &str) -> ConfigResult<()> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::Invalid(format!("{}: '{}' is not a valid URL: {}", key, value, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::Invalid(format!(
            "{}: unsupported scheme '{}', expected http or https",
            key, scheme
        ))),
    }
}
