//! Resolved client settings
//!
//! Precedence, lowest first: built-in defaults, the settings file, then the
//! process environment (after `.env` is loaded).

use crate::config::parse::{find_config_file, parse_settings_file};
use crate::config::schema::validate_url;
use crate::config::types::FileSettings;
use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_STORAGE_URL: &str = "http://localhost:8081";

/// Settings every command reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Explicitly configured API URL; see [`Settings::api_url`]
    pub api_url: Option<String>,
    pub storage_url: Option<String>,
    pub tenant_id: Option<String>,
    pub admin: Option<String>,
    pub timeout: Option<Duration>,
    pub auth_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tenant_name: Option<String>,
}

/// Everything needed to ask the identity service for a tenant id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCredentials {
    pub auth_url: String,
    pub tenant_name: String,
    pub username: String,
    pub password: String,
}

impl Settings {
    /// Load `.env`, the settings file if one is found, and the environment
    pub fn load() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();

        let file = match find_config_file() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading settings file");
                Some(parse_settings_file(&path)?)
            }
            None => None,
        };

        Self::from_sources(file, |key| env::var(key).ok())
    }

    /// Merge a settings file with variables from `lookup`
    ///
    /// Empty variables count as unset.
    pub fn from_sources<F>(file: Option<FileSettings>, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();
        let auth = file.auth.unwrap_or_default();
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let timeout = match var("LUNR_TIMEOUT") {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => file.timeout.map(Duration::from_secs),
        };

        let settings = Settings {
            api_url: var("LUNR_API_URL").or(file.api_url),
            storage_url: var("LUNR_STORAGE_URL").or(file.storage_url),
            tenant_id: var("LUNR_TENANT_ID").or(file.tenant_id),
            admin: var("LUNR_ADMIN").or(file.admin),
            timeout,
            auth_url: var("OS_AUTH_URL").or(auth.url),
            username: var("OS_USERNAME").or(auth.username),
            password: var("OS_PASSWORD").or(auth.password),
            tenant_name: var("OS_TENANT_NAME").or(auth.tenant_name),
        };

        if let Some(url) = &settings.api_url {
            validate_url("LUNR_API_URL", url)?;
        }
        if let Some(url) = &settings.storage_url {
            validate_url("LUNR_STORAGE_URL", url)?;
        }

        Ok(settings)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn storage_url(&self) -> &str {
        self.storage_url.as_deref().unwrap_or(DEFAULT_STORAGE_URL)
    }

    /// Credentials for a tenant lookup; every value must be configured
    pub fn auth_credentials(&self) -> ConfigResult<AuthCredentials> {
        let need = |name: &str, value: &Option<String>| {
            value
                .clone()
                .ok_or_else(|| ConfigError::MissingEnv(name.to_string()))
        };

        need("LUNR_API_URL", &self.api_url)?;
        let password = need("OS_PASSWORD", &self.password)?;
        let auth_url = need("OS_AUTH_URL", &self.auth_url)?;
        let username = need("OS_USERNAME", &self.username)?;
        let tenant_name = need("OS_TENANT_NAME", &self.tenant_name)?;

        Ok(AuthCredentials {
            auth_url,
            tenant_name,
            username,
            password,
        })
    }
}

fn parse_timeout(raw: &str) -> ConfigResult<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid(format!(
            "LUNR_TIMEOUT must be a positive number of seconds, got '{}'",
            raw
        ))),
    }
}
