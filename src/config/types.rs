//! Settings file types
//!
//! The shape of a `lunr.yml` file. Every key is optional; environment
//! variables override whatever the file provides.

use serde::{Deserialize, Serialize};

/// Contents of a settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    /// Lunr API endpoint (`LUNR_API_URL`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Storage node endpoint (`LUNR_STORAGE_URL`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_url: Option<String>,

    /// Tenant used when none is given on the command line (`LUNR_TENANT_ID`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    /// Admin tenant (`LUNR_ADMIN`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<String>,

    /// HTTP timeout in seconds (`LUNR_TIMEOUT`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Credentials used to look up a tenant id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthSettings>,
}

/// Identity service settings (`OS_*`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
}
