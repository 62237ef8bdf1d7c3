//! Common test utilities

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Split a command line on whitespace
pub fn argv(line: &str) -> Vec<String> {
    line.split_whitespace().map(String::from).collect()
}

/// Create a temporary directory with a lunr.yml file
pub fn create_settings_file(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("lunr.yml");
    fs::write(&path, content).unwrap();
    (temp_dir, path)
}

/// One of the workspace binaries, isolated from the caller's settings
///
/// Runs inside `home` with every variable the client reads cleared.
pub fn isolated(bin: &str, home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(bin).unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("LUNR_LOG");
    for key in [
        "LUNR_CONFIG",
        "LUNR_API_URL",
        "LUNR_STORAGE_URL",
        "LUNR_TENANT_ID",
        "LUNR_ADMIN",
        "LUNR_TIMEOUT",
        "OS_AUTH_URL",
        "OS_USERNAME",
        "OS_PASSWORD",
        "OS_TENANT_NAME",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

/// Volume as listed by a storage node
pub fn storage_volume(id: &str) -> Value {
    json!({
        "id": id,
        "name": id,
        "origin": "",
        "path": format!("/dev/lunr-volume/{}", id),
        "size": 12582912
    })
}

/// Volume as returned by the Lunr API
pub fn api_volume(id: &str, node_id: &str) -> Value {
    json!({
        "id": id,
        "account_id": "tenant1",
        "node_id": node_id,
        "size": 1,
        "status": "ACTIVE",
        "volume_type_name": "vtype",
        "restore_of": null,
        "created_at": "2013-01-01 00:00:00",
        "last_modified": "2013-01-01 00:00:00"
    })
}
