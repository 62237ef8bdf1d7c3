//! Tenant lookup against the identity service

use crate::client::http::{ClientOptions, HttpClient};
use crate::config::AuthCredentials;
use crate::error::{LunrError, Result};
use serde_json::{json, Value};

/// Password-credential client for the identity service's `/tokens` call
pub struct Auth {
    http: HttpClient,
    credentials: AuthCredentials,
}

impl Auth {
    pub fn new(credentials: AuthCredentials, options: &ClientOptions) -> Result<Self> {
        let http = HttpClient::new(credentials.auth_url.clone(), options)?;
        Ok(Auth { http, credentials })
    }

    /// Request a token and return the tenant id it was issued for
    pub fn fetch_tenant_id(&self) -> Result<String> {
        let payload = json!({
            "auth": {
                "tenantName": self.credentials.tenant_name,
                "passwordCredentials": {
                    "username": self.credentials.username,
                    "password": self.credentials.password,
                }
            }
        });

        let resp = self.http.post_json("/tokens", &payload)?;
        let tenant_id = resp
            .body
            .pointer("/access/token/tenant/id")
            .and_then(|id| match id {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .ok_or_else(|| LunrError::client("auth response did not include a tenant id"))?;

        tracing::debug!(tenant_id = %tenant_id, "resolved tenant id from auth");
        Ok(tenant_id)
    }
}
