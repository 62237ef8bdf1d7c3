//! Lunr API resources
//!
//! Every call is scoped to one tenant: `<api_url>/v1.0/<tenant_id>`.

use crate::client::http::{allowed, required, ClientOptions, HttpClient, Params, Response};
use crate::client::new_id;
use crate::error::{LunrError, Result};

const API_VERSION: &str = "v1.0";

const NODE_FIELDS: &[&str] = &[
    "hostname",
    "port",
    "storage_hostname",
    "volume_type_name",
    "size",
];

const EXPORT_UPDATE_FIELDS: &[&str] = &[
    "status",
    "instance_id",
    "mountpoint",
    "ip",
    "initiator",
    "session_ip",
    "session_initiator",
];

/// Client for one tenant of the Lunr API
#[derive(Debug, Clone)]
pub struct LunrClient {
    http: HttpClient,
    tenant_id: String,
}

impl LunrClient {
    pub fn new(api_url: &str, tenant_id: &str, options: &ClientOptions) -> Result<Self> {
        if tenant_id.is_empty() {
            return Err(LunrError::client("LunrClient requires a valid tenant_id"));
        }
        let base = format!("{}/{}/{}", api_url.trim_end_matches('/'), API_VERSION, tenant_id);
        Ok(LunrClient {
            http: HttpClient::new(base, options)?,
            tenant_id: tenant_id.to_string(),
        })
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn volumes(&self) -> Volumes<'_> {
        Volumes { http: &self.http }
    }

    pub fn backups(&self) -> Backups<'_> {
        Backups { http: &self.http }
    }

    pub fn accounts(&self) -> Accounts<'_> {
        Accounts { http: &self.http }
    }

    pub fn nodes(&self) -> Nodes<'_> {
        Nodes { http: &self.http }
    }

    pub fn exports(&self) -> Exports<'_> {
        Exports { http: &self.http }
    }
}

pub struct Volumes<'a> {
    http: &'a HttpClient,
}

impl Volumes<'_> {
    /// Filters: status, account_id, node_id, id, restore_of
    pub fn list(&self, filters: &Params) -> Result<Response> {
        self.http.get("/volumes", filters)
    }

    pub fn get(&self, volume_id: &str) -> Result<Response> {
        self.http.get(&format!("/volumes/{}", volume_id), &Params::new())
    }

    pub fn create(
        &self,
        volume_id: Option<&str>,
        vtype: &str,
        size: &str,
        affinity: Option<&str>,
    ) -> Result<Response> {
        let volume_id = volume_id.map(str::to_string).unwrap_or_else(new_id);
        let params = Params::new()
            .with("volume_type_name", vtype)
            .with("size", size)
            .with_opt("affinity", affinity);
        self.http.put(&format!("/volumes/{}", volume_id), &params)
    }

    /// Create a volume from a backup; `backup` and `size` are required
    pub fn restore(&self, volume_id: Option<&str>, mut params: Params) -> Result<Response> {
        required("restore", &params, &["backup", "size"])?;
        if !params.contains_key("volume_type_name") {
            params.insert("volume_type_name", "vtype");
        }
        let volume_id = volume_id.map(str::to_string).unwrap_or_else(new_id);
        self.http.put(&format!("/volumes/{}", volume_id), &params)
    }

    pub fn delete(&self, volume_id: &str) -> Result<Response> {
        self.http
            .delete(&format!("/volumes/{}", volume_id), &Params::new())
    }

    pub fn update_status(&self, volume_id: &str, status: &str) -> Result<Response> {
        self.http.post(
            &format!("/volumes/{}", volume_id),
            &Params::new().with("status", status),
        )
    }
}

pub struct Backups<'a> {
    http: &'a HttpClient,
}

impl Backups<'_> {
    /// Filters: status, account_id, id, volume_id
    pub fn list(&self, filters: &Params) -> Result<Response> {
        self.http.get("/backups", filters)
    }

    pub fn get(&self, backup_id: &str) -> Result<Response> {
        self.http.get(&format!("/backups/{}", backup_id), &Params::new())
    }

    pub fn create(&self, volume_id: &str, backup_id: Option<&str>) -> Result<Response> {
        let backup_id = backup_id.map(str::to_string).unwrap_or_else(new_id);
        self.http.put(
            &format!("/backups/{}", backup_id),
            &Params::new().with("volume", volume_id),
        )
    }

    /// Update the backup record; the stored backup is left alone
    pub fn update(&self, backup_id: &str, params: &Params) -> Result<Response> {
        self.http.post(&format!("/backups/{}", backup_id), params)
    }

    pub fn delete(&self, backup_id: &str) -> Result<Response> {
        self.http
            .delete(&format!("/backups/{}", backup_id), &Params::new())
    }
}

pub struct Accounts<'a> {
    http: &'a HttpClient,
}

impl Accounts<'_> {
    /// Filters: status, id
    pub fn list(&self, filters: &Params) -> Result<Response> {
        self.http.get("/accounts", filters)
    }

    pub fn get(&self, account_id: &str) -> Result<Response> {
        self.http
            .get(&format!("/accounts/{}", account_id), &Params::new())
    }

    pub fn create(&self, params: &Params) -> Result<Response> {
        required("create", params, &["id"])?;
        self.http.post("/accounts", params)
    }

    pub fn delete(&self, account_id: &str) -> Result<Response> {
        self.http
            .delete(&format!("/accounts/{}", account_id), &Params::new())
    }
}

pub struct Nodes<'a> {
    http: &'a HttpClient,
}

impl Nodes<'_> {
    /// Filters: name, status, volume_type_name
    pub fn list(&self, filters: &Params) -> Result<Response> {
        self.http.get("/nodes", filters)
    }

    pub fn get(&self, node_id: &str) -> Result<Response> {
        self.http.get(&format!("/nodes/{}", node_id), &Params::new())
    }

    pub fn create(&self, name: &str, params: &Params) -> Result<Response> {
        required("create", params, NODE_FIELDS)?;
        let params = params.clone().with("name", name);
        self.http.post("/nodes", &params)
    }

    pub fn update(&self, name: &str, params: &Params) -> Result<Response> {
        let mut allow = NODE_FIELDS.to_vec();
        allow.push("status");
        allowed("update", params, &allow)?;
        self.http.post(&format!("/nodes/{}", name), params)
    }

    pub fn delete(&self, node_id: &str) -> Result<Response> {
        self.http
            .delete(&format!("/nodes/{}", node_id), &Params::new())
    }
}

pub struct Exports<'a> {
    http: &'a HttpClient,
}

impl Exports<'_> {
    pub fn get(&self, volume_id: &str) -> Result<Response> {
        self.http
            .get(&format!("/volumes/{}/export", volume_id), &Params::new())
    }

    pub fn create(&self, volume_id: &str, ip: &str, initiator: &str) -> Result<Response> {
        self.http.put(
            &format!("/volumes/{}/export", volume_id),
            &Params::new().with("ip", ip).with("initiator", initiator),
        )
    }

    pub fn delete(&self, volume_id: &str, force: bool) -> Result<Response> {
        self.http.delete(
            &format!("/volumes/{}/export", volume_id),
            &Params::new().with("force", force),
        )
    }

    pub fn update(&self, volume_id: &str, params: &Params) -> Result<Response> {
        allowed("update", params, EXPORT_UPDATE_FIELDS)?;
        self.http
            .post(&format!("/volumes/{}/export", volume_id), params)
    }
}
