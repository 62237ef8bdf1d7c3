//! End-to-end tests for the `lunr` and `storage` binaries

mod common;

use common::{api_volume, create_settings_file, isolated, storage_volume};
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_env_group_prints_variables() {
    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .arg("env")
        .env("USER", "derrick")
        .assert()
        .success()
        .stdout(predicate::str::contains("export OS_TENANT_NAME='derrick'"));
}

#[test]
fn test_unknown_group_shows_help() {
    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .arg("nope")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage: lunr <command> [-h]"))
        .stdout(predicate::str::contains("Command line interface to the lunr api"))
        .stdout(predicate::str::contains("   volume\n"));
}

#[test]
fn test_group_without_command_shows_group_help() {
    let home = TempDir::new().unwrap();
    isolated("storage", &home)
        .arg("status")
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with(
            "Usage: storage status <command> [-h]",
        ))
        .stdout(predicate::str::contains("   api\n   conf\n   list\n"));
}

#[test]
fn test_bash_completion() {
    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args(["--bash-completion", "lunr"])
        .assert()
        .success()
        .stdout("backup volume env node export account\n");

    isolated("lunr", &home)
        .args(["--bash-completion", "lunr", "volume"])
        .assert()
        .success()
        .stdout("create delete get list restore update-status\n");
}

#[test]
fn test_completion_scripts() {
    let home = TempDir::new().unwrap();
    isolated("storage", &home)
        .arg("--bash-completion-script")
        .assert()
        .success()
        .stdout(predicate::str::contains("complete -F _storage storage"));

    isolated("lunr", &home)
        .args(["--completion-script", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef lunr"));
}

#[test]
fn test_bad_option_exits_with_usage_code() {
    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args(["volume", "get", "vol1", "--bogus"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--bogus"));
}

#[test]
fn test_admin_required() {
    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args(["account", "list"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with(
            "--admin or environ LUNR_ADMIN required\nUsage: lunr account <command> [-h]",
        ));
}

#[test]
fn test_volume_get_without_summary() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1.0/tenant1/volumes/vol1");
        then.status(200).json_body(api_volume("vol1", "node1"));
    });

    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args(["volume", "get", "vol1", "-n"])
        .env("LUNR_API_URL", server.base_url())
        .env("LUNR_TENANT_ID", "tenant1")
        .assert()
        .success()
        .stdout(predicate::str::contains("node_id: node1"))
        .stdout(predicate::str::contains("-- HTTP Code").not());
    mock.assert();
}

#[test]
fn test_tenant_id_from_settings_file() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1.0/from-file/backups");
        then.status(200).json_body(json!([]));
    });

    let (home, _path) = create_settings_file(&format!(
        "api_url: {}\ntenant_id: from-file\n",
        server.base_url()
    ));
    isolated("lunr", &home)
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout("-- Empty Response --\n");
    mock.assert();
}

#[test]
fn test_http_error_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path("/v1.0/tenant1/volumes/missing");
        then.status(404).json_body(json!({"reason": "Not Found"}));
    });

    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args(["volume", "delete", "missing"])
        .env("LUNR_API_URL", server.base_url())
        .env("LUNR_TENANT_ID", "tenant1")
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("Code: 404 - "))
        .stdout(predicate::str::contains("with 'Not Found'"));
}

#[test]
fn test_storage_volume_list() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/volumes");
        then.status(200).json_body(json!([storage_volume("thrawn")]));
    });

    let home = TempDir::new().unwrap();
    isolated("storage", &home)
        .args(["volume", "list"])
        .env("LUNR_STORAGE_URL", server.base_url())
        .assert()
        .success()
        .stdout(predicate::str::contains("/dev/lunr-volume/thrawn"))
        .stdout(predicate::str::contains("12582912"))
        .stdout(predicate::str::contains("origin").not());
    mock.assert();
}

#[test]
fn test_storage_clone_needs_source() {
    let home = TempDir::new().unwrap();
    isolated("storage", &home)
        .args(["volume", "clone", "10"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with(
            "options --src or --backup are required\n",
        ));
}

#[test]
fn test_bad_settings_do_not_break_completion_or_env() {
    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args(["--bash-completion", "lunr"])
        .env("LUNR_TIMEOUT", "soon")
        .assert()
        .success()
        .stdout("backup volume env node export account\n");

    isolated("lunr", &home)
        .arg("env")
        .env("LUNR_TIMEOUT", "soon")
        .assert()
        .success();

    isolated("storage", &home)
        .arg("--bash-completion-script")
        .env("LUNR_TIMEOUT", "soon")
        .assert()
        .success();
}

#[test]
fn test_bad_settings_file_does_not_break_completion() {
    let (home, _path) = create_settings_file("api_url: [unclosed\n");
    isolated("lunr", &home)
        .args(["--bash-completion", "lunr", "volume"])
        .assert()
        .success()
        .stdout("create delete get list restore update-status\n");
}

#[test]
fn test_bad_settings_fail_the_command() {
    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args(["volume", "list"])
        .env("LUNR_TIMEOUT", "soon")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "LUNR_TIMEOUT must be a positive number of seconds, got 'soon'",
        ));
}

#[test]
fn test_volume_list_adds_node_names() {
    let server = MockServer::start();
    let volumes = server.mock(|when, then| {
        when.method(GET).path("/v1.0/tenant1/volumes");
        then.status(200)
            .json_body(json!([api_volume("vol1", "node1"), api_volume("vol2", "node9")]));
    });
    let nodes = server.mock(|when, then| {
        when.method(GET).path("/v1.0/admin/nodes");
        then.status(200)
            .json_body(json!([{"id": "node1", "name": "storage-a", "status": "ACTIVE"}]));
    });

    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args(["volume", "list"])
        .env("LUNR_API_URL", server.base_url())
        .env("LUNR_TENANT_ID", "tenant1")
        .env("LUNR_ADMIN", "admin")
        .assert()
        .success()
        .stdout(predicate::str::contains("node-name"))
        .stdout(predicate::str::contains("storage-a"))
        .stdout(predicate::str::contains("account_id").not())
        .stdout(predicate::str::ends_with(
            "\nThis is a summary, use --no-nodes to see the entire response\n",
        ));
    volumes.assert();
    nodes.assert();
}

/// Lunr API and storage node served by one mock; the node points back at it
fn volume_on_node(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/v1.0/tenant1/volumes/vol1");
        then.status(200).json_body(api_volume("vol1", "node1"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1.0/admin/nodes/node1");
        then.status(200).json_body(json!({
            "id": "node1",
            "hostname": "127.0.0.1",
            "port": server.port()
        }));
    });
}

#[test]
fn test_volume_get_summary_not_exported() {
    let server = MockServer::start();
    volume_on_node(&server);
    let export = server.mock(|when, then| {
        when.method(GET).path("/volumes/vol1/export");
        then.status(404).json_body(json!({"reason": "Not Found"}));
    });

    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args(["volume", "get", "vol1"])
        .env("LUNR_API_URL", server.base_url())
        .env("LUNR_TENANT_ID", "tenant1")
        .env("LUNR_ADMIN", "admin")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "node-url: http://127.0.0.1:{}",
            server.port()
        )))
        .stdout(predicate::str::contains("in-use: (not exported)"))
        .stdout(predicate::str::contains("iqn: (not exported)"))
        .stdout(predicate::str::contains("volume_type_name").not())
        .stdout(predicate::str::contains("use --no-summary to see the entire response"));
    export.assert();
}

#[test]
fn test_volume_get_summary_connected() {
    let server = MockServer::start();
    volume_on_node(&server);
    server.mock(|when, then| {
        when.method(GET).path("/volumes/vol1/export");
        then.status(200).json_body(json!({
            "name": "iqn.2010-11.com.rackspace:vol1",
            "sessions": [{"ip": "10.1.1.1"}, {"ip": "10.1.1.2"}]
        }));
    });

    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args(["volume", "get", "vol1", "--admin", "admin"])
        .env("LUNR_API_URL", server.base_url())
        .env("LUNR_TENANT_ID", "tenant1")
        .assert()
        .success()
        .stdout(predicate::str::contains("in-use: 10.1.1.1,10.1.1.2"))
        .stdout(predicate::str::contains("iqn: iqn.2010-11.com.rackspace:vol1"));
}

#[test]
fn test_node_get_lists_volumes_with_tenants() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1.0/admin/nodes/node1");
        then.status(200).json_body(json!({
            "id": "node1",
            "name": "storage-a",
            "hostname": "127.0.0.1",
            "port": server.port()
        }));
    });
    let mut big = storage_volume("vol1");
    big["size"] = json!(2147483648u64);
    server.mock(|when, then| {
        when.method(GET).path("/volumes");
        then.status(200).json_body(json!([big, storage_volume("vol2")]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1.0/admin/volumes/vol1");
        then.status(200).json_body(json!({"id": "vol1", "account_id": "tenant7"}));
    });
    let missing = server.mock(|when, then| {
        when.method(GET).path("/v1.0/admin/volumes/vol2");
        then.status(404).json_body(json!({"reason": "Not Found"}));
    });

    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args(["node", "get", "node1", "--admin", "admin"])
        .env("LUNR_API_URL", server.base_url())
        .assert()
        .success()
        .stdout(predicate::str::contains("name: storage-a"))
        .stdout(predicate::str::contains("tenant-id"))
        .stdout(predicate::str::contains("gigs"))
        .stdout(predicate::str::contains("tenant7"))
        .stdout(predicate::str::contains("DELETING"))
        .stdout(predicate::str::is_match(r"\| 2147483648 \| 2 +\|").unwrap())
        .stdout(predicate::str::contains("use --no-summary to see the entire response"));
    missing.assert();
}

#[test]
fn test_account_get_shows_active_volumes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1.0/admin/accounts/tenant7");
        then.status(200).json_body(json!({
            "id": "tenant7",
            "name": "seven",
            "status": "ACTIVE"
        }));
    });
    let volumes = server.mock(|when, then| {
        when.method(GET)
            .path("/v1.0/admin/volumes")
            .query_param("account_id", "tenant7");
        then.status(200).json_body(json!([
            {"id": "live1", "status": "ACTIVE", "size": 1},
            {"id": "gone1", "status": "DELETED", "size": 1}
        ]));
    });

    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args(["account", "get", "tenant7"])
        .env("LUNR_API_URL", server.base_url())
        .env("LUNR_ADMIN", "admin")
        .assert()
        .success()
        .stdout(predicate::str::contains("name: seven"))
        .stdout(predicate::str::contains("live1"))
        .stdout(predicate::str::contains("gone1").not())
        .stdout(predicate::str::contains("no active volumes").not());
    volumes.assert();
}

#[test]
fn test_account_get_without_active_volumes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1.0/admin/accounts/tenant7");
        then.status(200)
            .json_body(json!({"id": "tenant7", "name": "seven", "status": "ACTIVE"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1.0/admin/volumes");
        then.status(200)
            .json_body(json!([{"id": "gone1", "status": "DELETED", "size": 1}]));
    });

    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args(["account", "get", "tenant7", "--admin", "admin"])
        .env("LUNR_API_URL", server.base_url())
        .assert()
        .success()
        .stdout(predicate::str::contains("-- This account has no active volumes --\n"))
        .stdout(predicate::str::contains("gone1").not())
        .stdout(predicate::str::contains("use --no-summary to see the entire response"));
}

#[test]
fn test_node_and_export_failures_are_reported_inline() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1.0/admin/nodes")
            .query_param("size", "10")
            .query_param_exists("name");
        then.status(409).json_body(json!({"reason": "Duplicate node"}));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1.0/admin/nodes/node1")
            .query_param("status", "ACTIVE");
        then.status(404).json_body(json!({"reason": "No such node"}));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1.0/tenant1/volumes/vol1/export")
            .query_param("status", "ATTACHING")
            .query_param_missing("tenant_id");
        then.status(400).json_body(json!({"reason": "Bad status"}));
    });

    let home = TempDir::new().unwrap();
    let cases: [(&[&str], &str); 3] = [
        (
            &[
                "node", "create", "-s", "10", "-t", "vtype", "-S", "10.0.0.1", "-P", "8081",
                "-H", "10.0.0.1",
            ],
            "/v1.0/admin/nodes returned '409' with 'Duplicate node'",
        ),
        (
            &["node", "update", "node1", "--status", "ACTIVE"],
            "/v1.0/admin/nodes/node1 returned '404' with 'No such node'",
        ),
        (
            &["export", "update", "vol1", "--tenant-id", "tenant1", "-s", "ATTACHING"],
            "/v1.0/tenant1/volumes/vol1/export returned '400' with 'Bad status'",
        ),
    ];
    for (args, message) in cases {
        isolated("lunr", &home)
            .args(args)
            .env("LUNR_API_URL", server.base_url())
            .env("LUNR_ADMIN", "admin")
            .assert()
            .code(1)
            .stdout(predicate::str::starts_with(format!(
                "-- {}{}",
                server.base_url(),
                message
            )));
    }
}

#[test]
fn test_volume_restore_sends_only_restore_options() {
    let server = MockServer::start();
    let restore = server.mock(|when, then| {
        when.method(PUT)
            .path("/v1.0/tenant1/volumes/vol9")
            .query_param("backup", "bak1")
            .query_param("size", "5")
            .query_param("volume_type_name", "vtype")
            .query_param_missing("tenant_id")
            .query_param_missing("admin")
            .query_param_missing("debug")
            .query_param_missing("id");
        then.status(200)
            .json_body(json!({"id": "vol9", "status": "BUILDING"}));
    });

    let home = TempDir::new().unwrap();
    isolated("lunr", &home)
        .args([
            "volume", "restore", "bak1", "--size", "5", "--id", "vol9", "--tenant-id", "tenant1",
            "--admin", "root", "-d",
        ])
        .env("LUNR_API_URL", server.base_url())
        .assert()
        .success()
        .stdout(predicate::str::contains("status: BUILDING"));
    restore.assert();
}
