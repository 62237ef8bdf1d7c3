//! HTTP clients for the Lunr API, storage nodes and the identity service

pub mod auth;
pub mod http;
pub mod lunr;
pub mod storage;

pub use auth::Auth;
pub use http::{allowed, required, ClientOptions, HttpClient, Params, Response};
pub use lunr::LunrClient;
pub use storage::{CloneSource, StorageClient};

/// A fresh resource id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
