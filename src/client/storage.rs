//! Storage node API resources

use crate::client::http::{ClientOptions, HttpClient, Params, Response};
use crate::client::new_id;
use crate::error::Result;
use std::time::{SystemTime, UNIX_EPOCH};

/// Client for a single storage node
#[derive(Debug, Clone)]
pub struct StorageClient {
    http: HttpClient,
}

impl StorageClient {
    pub fn new(url: &str, options: &ClientOptions) -> Result<Self> {
        Ok(StorageClient {
            http: HttpClient::new(url.trim_end_matches('/'), options)?,
        })
    }

    pub fn url(&self) -> &str {
        self.http.base_url()
    }

    pub fn status(&self) -> Status<'_> {
        Status { http: &self.http }
    }

    pub fn volumes(&self) -> Volumes<'_> {
        Volumes { http: &self.http }
    }

    pub fn backups(&self) -> Backups<'_> {
        Backups { http: &self.http }
    }

    pub fn exports(&self) -> Exports<'_> {
        Exports { http: &self.http }
    }
}

pub struct Status<'a> {
    http: &'a HttpClient,
}

impl Status<'_> {
    pub fn list(&self) -> Result<Response> {
        self.http.get("/status", &Params::new())
    }

    pub fn api(&self) -> Result<Response> {
        self.http.get("/status/api", &Params::new())
    }

    /// The storage node configuration
    pub fn conf(&self) -> Result<Response> {
        self.http.get("/status/conf", &Params::new())
    }
}

/// Source of a cloned volume
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneSource<'a> {
    pub volume_id: Option<&'a str>,
    pub backup_id: Option<&'a str>,
    pub host: Option<&'a str>,
}

pub struct Volumes<'a> {
    http: &'a HttpClient,
}

impl Volumes<'_> {
    pub fn list(&self) -> Result<Response> {
        self.http.get("/volumes", &Params::new())
    }

    pub fn get(&self, volume_id: &str) -> Result<Response> {
        self.http.get(&format!("/volumes/{}", volume_id), &Params::new())
    }

    pub fn create(&self, size: &str, volume_id: Option<&str>) -> Result<Response> {
        let volume_id = volume_id.map(str::to_string).unwrap_or_else(new_id);
        self.http.put(
            &format!("/volumes/{}", volume_id),
            &Params::new().with("size", size),
        )
    }

    /// Create a volume and fill it from another volume or a backup
    pub fn clone(
        &self,
        source: &CloneSource<'_>,
        size: &str,
        volume_id: Option<&str>,
    ) -> Result<Response> {
        let volume_id = volume_id.map(str::to_string).unwrap_or_else(new_id);
        let params = Params::new()
            .with_opt("source_host", source.host)
            .with_opt("source_volume_id", source.volume_id)
            .with_opt("backup_id", source.backup_id)
            .with("size", size);
        self.http.put(&format!("/volumes/{}", volume_id), &params)
    }

    pub fn delete(&self, volume_id: &str) -> Result<Response> {
        self.http
            .delete(&format!("/volumes/{}", volume_id), &Params::new())
    }

    /// Compare the backup manifest with stored blocks and drop orphans
    pub fn audit(&self, volume_id: &str) -> Result<Response> {
        self.http
            .put(&format!("/volumes/{}/audit", volume_id), &Params::new())
    }

    pub fn lock(&self, volume_id: &str) -> Result<Response> {
        self.http
            .get(&format!("/volumes/{}/lock", volume_id), &Params::new())
    }
}

pub struct Backups<'a> {
    http: &'a HttpClient,
}

impl Backups<'_> {
    pub fn list(&self, volume_id: &str) -> Result<Response> {
        self.http
            .get(&format!("/volumes/{}/backups", volume_id), &Params::new())
    }

    pub fn get(&self, volume_id: &str, backup_id: &str) -> Result<Response> {
        self.http.get(
            &format!("/volumes/{}/backups/{}", volume_id, backup_id),
            &Params::new(),
        )
    }

    /// `timestamp` defaults to now, in seconds since the epoch
    pub fn create(
        &self,
        volume_id: &str,
        backup_id: Option<&str>,
        timestamp: Option<&str>,
    ) -> Result<Response> {
        let backup_id = backup_id.map(str::to_string).unwrap_or_else(new_id);
        let timestamp = timestamp.map(str::to_string).unwrap_or_else(now);
        self.http.put(
            &format!("/volumes/{}/backups/{}", volume_id, backup_id),
            &Params::new().with("timestamp", timestamp),
        )
    }

    pub fn delete(&self, volume_id: &str, backup_id: &str) -> Result<Response> {
        self.http.delete(
            &format!("/volumes/{}/backups/{}", volume_id, backup_id),
            &Params::new(),
        )
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

    pub fn create(&self, volume_id: &str, ip: Option<&str>) -> Result<Response> {
        self.http.put(
            &format!("/volumes/{}/export", volume_id),
            &Params::new().with_opt("ip", ip),
        )
    }

    pub fn delete(&self, volume_id: &str, force: bool) -> Result<Response> {
        self.http.delete(
            &format!("/volumes/{}/export", volume_id),
            &Params::new().with("force", force),
        )
    }
}

fn now() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}
