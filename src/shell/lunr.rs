//! The `lunr` program: command groups over the Lunr API

use crate::cli::{
    CommandGroup, CommandTable, FromArgs, Invocation, Opt, Outcome, ParsedArgs, SubCommandParser,
};
use crate::client::{new_id, Auth, ClientOptions, LunrClient, Params, Response, StorageClient};
use crate::config::Settings;
use crate::display::display;
use crate::error::{DispatchResult, LunrError, Result};
use crate::shell::{debug_option, env::Env, finish, split_argv};
use anyhow::Context;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

const DESCRIPTION: &str = "Command line interface to the lunr api";

/// Global options of the lunr groups, read from leftover arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LunrGlobals {
    pub debug: bool,
    pub tenant_id: Option<String>,
    pub admin: Option<String>,
}

impl FromArgs for LunrGlobals {
    fn from_args(args: &ParsedArgs) -> Result<Self> {
        Ok(LunrGlobals {
            debug: args.flag("debug"),
            tenant_id: args.str("tenant_id").map(str::to_string),
            admin: args.str("admin").map(str::to_string),
        })
    }
}

/// State shared by every lunr group
///
/// Settings are read on first use, so help and completion never depend on them.
pub struct LunrShell {
    settings: Settings,
    pending: bool,
    debug: bool,
    client: Option<LunrClient>,
}

impl LunrShell {
    /// Shell that loads its settings before the first command
    pub fn new() -> Self {
        LunrShell {
            settings: Settings::default(),
            pending: true,
            debug: false,
            client: None,
        }
    }

    pub fn with_settings(settings: Settings) -> Self {
        LunrShell {
            settings,
            pending: false,
            debug: false,
            client: None,
        }
    }

    /// Load settings if still pending and apply `--debug`
    pub fn prepare(&mut self, globals: &LunrGlobals) -> Result<()> {
        if self.pending {
            self.settings = Settings::load()?;
            self.pending = false;
        }
        self.debug = globals.debug;
        Ok(())
    }

    fn options(&self) -> ClientOptions {
        ClientOptions::default()
            .timeout(self.settings.timeout)
            .debug(self.debug)
    }

    /// Client built by the pre-command hook
    pub fn client(&self) -> Result<&LunrClient> {
        self.client
            .as_ref()
            .ok_or_else(|| LunrError::client("no Lunr client; the pre-command hook did not run"))
    }

    /// `--admin`, else `LUNR_ADMIN`
    pub fn admin(&self, globals: &LunrGlobals) -> Result<String> {
        globals
            .admin
            .clone()
            .or_else(|| self.settings.admin.clone())
            .ok_or_else(|| LunrError::shell("--admin or environ LUNR_ADMIN required"))
    }

    /// A client acting as the admin tenant
    pub fn admin_client(&self, globals: &LunrGlobals) -> Result<LunrClient> {
        LunrClient::new(self.settings.api_url(), &self.admin(globals)?, &self.options())
    }

    /// Client for `tenant_id`, else `LUNR_TENANT_ID`, else the tenant auth resolves
    pub fn client_factory(&self, tenant_id: Option<&str>) -> Result<LunrClient> {
        let tenant_id = tenant_id
            .map(str::to_string)
            .or_else(|| self.settings.tenant_id.clone());

        if let Some(tenant_id) = tenant_id {
            return LunrClient::new(self.settings.api_url(), &tenant_id, &self.options());
        }

        tracing::debug!("LUNR_TENANT_ID not set, attempting to contact Auth to resolve tenant_id");
        let credentials = self.settings.auth_credentials()?;
        let tenant_id = Auth::new(credentials, &self.options())?.fetch_tenant_id()?;
        LunrClient::new(self.settings.api_url(), &tenant_id, &self.options())
    }

    /// Build the group's client; runs before every command
    fn connect(&mut self, globals: &LunrGlobals, tenant_id: Option<&str>) -> Result<()> {
        self.prepare(globals)?;
        self.client = Some(self.client_factory(tenant_id)?);
        Ok(())
    }

    fn storage(&self, url: &str) -> Result<StorageClient> {
        StorageClient::new(url, &self.options())
    }
}

impl Default for LunrShell {
    fn default() -> Self {
        Self::new()
    }
}

/// Text form of an id-like value
fn key_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Keep rows whose `key` equals `value`
pub fn filter(resp: &Response, key: &str, value: &str) -> Response {
    let rows = resp
        .rows()
        .into_iter()
        .filter(|row| row.get(key).and_then(key_of).as_deref() == Some(value))
        .map(Value::Object)
        .collect();
    Response::new(Value::Array(rows), resp.code)
}

/// Index rows by `key`
pub fn to_map(resp: &Response, key: &str) -> HashMap<String, Map<String, Value>> {
    resp.rows()
        .into_iter()
        .filter_map(|row| row.get(key).and_then(key_of).map(|k| (k, row)))
        .collect()
}

/// Initiator addresses connected to an export
pub fn is_connected(payload: &Value) -> String {
    if payload.get("error").is_some() {
        return "(error)".to_string();
    }
    if !is_truthy(payload) {
        return "(not exported)".to_string();
    }

    let ips: Vec<String> = payload
        .get("sessions")
        .and_then(Value::as_array)
        .map(|sessions| {
            sessions
                .iter()
                .map(|s| s.get("ip").and_then(key_of).unwrap_or_else(|| "False".to_string()))
                .collect()
        })
        .unwrap_or_default();

    if ips.is_empty() {
        "False".to_string()
    } else {
        ips.join(",")
    }
}

/// Target name of an export
pub fn iqn(payload: &Value) -> String {
    if payload.get("error").is_some() {
        return "(error)".to_string();
    }
    if !is_truthy(payload) {
        return "(not exported)".to_string();
    }
    payload
        .get("name")
        .and_then(key_of)
        .unwrap_or_else(|| "(not exported)".to_string())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Report a node or export API failure inline, as `-- <message>`
fn reported(result: Result<Response>) -> Result<Outcome> {
    match result {
        Ok(resp) => {
            display(&resp, &[]);
            Ok(Outcome::Done)
        }
        Err(e @ (LunrError::Client(_) | LunrError::Http { .. })) => {
            println!("-- {}", e);
            Ok(Outcome::Status(1))
        }
        Err(e) => Err(e),
    }
}

fn summary_note(flag: &str) {
    println!("\nThis is a summary, use {} to see the entire response", flag);
}

fn tenant_id_option(help: &str) -> Opt {
    Opt::new(["--tenant-id"]).help(help)
}

fn admin_option(help: &str) -> Opt {
    Opt::new(["--admin"]).help(help)
}

fn no_summary_option() -> Opt {
    Opt::new(["-n", "--no-summary"])
        .store_true()
        .help("show only the response")
}

/// Manage lunr volumes
#[derive(Default)]
pub struct Volume {
    shell: LunrShell,
}

impl Volume {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let filters = Params::from(&inv.args.without(&["debug", "tenant_id", "admin", "no_nodes"]));
        let mut volumes = self.shell.client()?.volumes().list(&filters)?;
        if inv.args.flag("no_nodes") {
            display(&volumes, &[]);
            return Ok(Outcome::Done);
        }

        let admin = self.shell.admin_client(&inv.globals)?;
        let nodes = to_map(&admin.nodes().list(&Params::new())?, "id");
        if let Value::Array(rows) = &mut volumes.body {
            for row in rows.iter_mut() {
                let name = row
                    .get("node_id")
                    .and_then(key_of)
                    .and_then(|id| nodes.get(&id))
                    .and_then(|node| node.get("name"))
                    .cloned()
                    .unwrap_or_else(|| json!(""));
                if let Value::Object(row) = row {
                    row.insert("node-name".to_string(), name);
                }
            }
        }

        display(
            &volumes,
            &["id", "node-name", "volume_type_name", "restore_of", "status", "size"],
        );
        summary_note("--no-nodes");
        Ok(Outcome::Done)
    }

    fn get(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let id = inv.args.require("id")?;
        let mut volume = self.shell.client()?.volumes().get(id)?;
        if inv.args.flag("no_summary") {
            display(&volume, &[]);
            return Ok(Outcome::Done);
        }

        let admin = self.shell.admin_client(&inv.globals)?;
        let node = admin.nodes().get(&volume.field("node_id")?)?;
        let node_url = format!("http://{}:{}", node.field("hostname")?, node.field("port")?);

        let payload = match self.shell.storage(&node_url)?.exports().get(id) {
            Ok(resp) => resp.body,
            Err(e) if e.http_code() == Some(404) => json!({}),
            Err(e) => return Err(e),
        };

        volume.insert("node-url", node_url);
        volume.insert("in-use", is_connected(&payload));
        volume.insert("iqn", iqn(&payload));
        display(
            &volume,
            &[
                "account_id",
                "status",
                "size",
                "node_id",
                "node-url",
                "in-use",
                "iqn",
                "created_at",
                "last_modified",
            ],
        );
        summary_note("--no-summary");
        Ok(Outcome::Done)
    }

    fn create(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let args = &inv.args;
        let mut affinity = args.str("diff_node").map(|ids| format!("different_node:{}", ids));
        if let Some(ids) = args.str("diff_group") {
            affinity = Some(format!("different_group:{}", ids));
        }

        let result = self.shell.client()?.volumes().create(
            args.str("id"),
            args.str_or("vtype", "vtype"),
            args.require("size")?,
            affinity.as_deref(),
        )?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }

    fn restore(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let params = Params::from(&inv.args.without(&["debug", "tenant_id", "admin", "id"]));
        let result = self
            .shell
            .client()?
            .volumes()
            .restore(inv.args.str("id"), params)?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }

    fn delete(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let result = self.shell.client()?.volumes().delete(inv.args.require("id")?)?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }

    fn update_status(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let volume = self
            .shell
            .client()?
            .volumes()
            .update_status(inv.args.require("id")?, inv.args.require("status")?)?;
        display(&volume, &[]);
        Ok(Outcome::Done)
    }
}

impl CommandGroup for Volume {
    type Globals = LunrGlobals;

    fn name(&self) -> &str {
        "volume"
    }

    fn about(&self) -> Option<&str> {
        Some("Manage lunr volumes")
    }

    fn global_options(&self) -> Vec<Opt> {
        vec![
            debug_option(),
            tenant_id_option("the tenant-id that owns the volume"),
            admin_option("the admin tenant id"),
        ]
    }

    fn register(table: &mut CommandTable<Self>) {
        table
            .command("list", Volume::list)
            .raw_args()
            .opt(Opt::new(["-N", "--no-nodes"]).store_true().help(
                "show only the response, do not query for node details",
            ))
            .opt(Opt::new(["-r", "--restore-of"]).help("Filter the list by restore_of"))
            .opt(Opt::new(["-i", "--id"]).help("Filter the list by volume id"))
            .opt(Opt::new(["-n", "--node-id"]).help("Filter the list by node_id"))
            .opt(Opt::new(["-a", "--account-id"]).help("Filter the list by account_id"))
            .opt(Opt::new(["-s", "--status"]).help("Filter the list by status"));

        table
            .command("get", Volume::get)
            .opt(Opt::new(["id"]).help("id that identifies the volume"))
            .opt(no_summary_option());

        table
            .command("create", Volume::create)
            .opt(Opt::new(["size"]).help("size of the new volume (in gigabytes)"))
            .opt(Opt::new(["--diff-group"]).help(
                "Create the volume on a node that is in a different group than the group \
                 that contains the node with the volume id specified; accepts multiple \
                 volume-id's separated by commas",
            ))
            .opt(Opt::new(["--diff-node"]).help(
                "Create the volume on a different node than the node that contains the \
                 volume id specified; accepts multiple volume-id's separated by commas",
            ))
            .opt(Opt::new(["--vtype"]).help("the type of volume to create"))
            .opt(Opt::new(["--id"]).help("id that will identify the new volume"));

        table
            .command("restore", Volume::restore)
            .raw_args()
            .opt(Opt::new(["backup"]).help("backup id to restore from"))
            .opt(
                Opt::new(["--size"])
                    .required()
                    .help("size of the new volume (in gigabytes)"),
            )
            .opt(Opt::new(["--volume-type-name"]).help("the type of volume to create"))
            .opt(Opt::new(["--id"]).help("id that will identify the new volume"));

        table
            .command("delete", Volume::delete)
            .opt(Opt::new(["id"]).help("id that identifies the volume"));

        table
            .command("update_status", Volume::update_status)
            .opt(
                Opt::new(["--status"])
                    .required()
                    .choices(["ACTIVE", "DELETED", "DELETING", "CLONING"])
                    .help("Sets the status"),
            )
            .opt(Opt::new(["id"]).help("id that identifies the volume"));
    }

    fn pre_command(&mut self, globals: &LunrGlobals) -> Result<()> {
        self.shell.connect(globals, globals.tenant_id.as_deref())
    }
}

/// Manage lunr backups
#[derive(Default)]
pub struct Backup {
    shell: LunrShell,
}

impl Backup {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&mut self, _inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let result = self.shell.client()?.backups().list(&Params::new())?;
        display(&result, &["id", "volume_id", "status", "size", "created_at"]);
        Ok(Outcome::Done)
    }

    fn get(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let result = self.shell.client()?.backups().get(inv.args.require("id")?)?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }

    fn create(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let result = self
            .shell
            .client()?
            .backups()
            .create(inv.args.require("src")?, inv.args.str("id"))?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }

    fn delete(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let result = self.shell.client()?.backups().delete(inv.args.require("id")?)?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }
}

impl CommandGroup for Backup {
    type Globals = LunrGlobals;

    fn name(&self) -> &str {
        "backup"
    }

    fn about(&self) -> Option<&str> {
        Some("Manage lunr backups")
    }

    fn global_options(&self) -> Vec<Opt> {
        vec![
            debug_option(),
            tenant_id_option("the tenant-id that owns the backup"),
        ]
    }

    fn register(table: &mut CommandTable<Self>) {
        table.command("list", Backup::list).no_args();
        table
            .command("get", Backup::get)
            .opt(Opt::new(["id"]).help("id that identifies the backup"));
        table
            .command("create", Backup::create)
            .opt(Opt::new(["--id"]).help("id that will identify the new backup"))
            .opt(Opt::new(["src"]).help("the volume id to create the backup from"));
        table
            .command("delete", Backup::delete)
            .opt(Opt::new(["id"]).help("id that identifies the backup"));
    }

    fn pre_command(&mut self, globals: &LunrGlobals) -> Result<()> {
        self.shell.connect(globals, globals.tenant_id.as_deref())
    }
}

/// List lunr accounts
#[derive(Default)]
pub struct Account {
    shell: LunrShell,
}

impl Account {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let filters = if inv.args.flag("all") {
            Params::new()
        } else {
            Params::new().with("status", "ACTIVE")
        };
        let resp = self.shell.client()?.accounts().list(&filters)?;
        display(&resp, &["id", "name", "status"]);
        Ok(Outcome::Done)
    }

    /// List details for a specific tenant id
    fn get(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let resp = self.shell.client()?.accounts().get(inv.args.require("id")?)?;
        if inv.args.flag("no_summary") {
            display(&resp, &[]);
            return Ok(Outcome::Done);
        }

        let admin = self.shell.admin_client(&inv.globals)?;
        let volumes = admin
            .volumes()
            .list(&Params::new().with("account_id", resp.field("id")?))?;
        let active: Vec<Value> = volumes
            .rows()
            .into_iter()
            .filter(|volume| volume.get("status").and_then(Value::as_str) != Some("DELETED"))
            .map(Value::Object)
            .collect();

        display(&resp, &["name", "status", "last_modified", "created_at"]);
        if !active.is_empty() {
            display(&Response::new(Value::Array(active), 200), &["id", "status", "size"]);
            return Ok(Outcome::Done);
        }
        println!("-- This account has no active volumes --");
        summary_note("--no-summary");
        Ok(Outcome::Done)
    }

    fn create(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let params = Params::new().with("id", inv.args.require("id")?);
        let resp = self.shell.client()?.accounts().create(&params)?;
        display(&resp, &[]);
        Ok(Outcome::Done)
    }

    fn delete(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let resp = self.shell.client()?.accounts().delete(inv.args.require("id")?)?;
        display(&resp, &[]);
        Ok(Outcome::Done)
    }
}

impl CommandGroup for Account {
    type Globals = LunrGlobals;

    fn name(&self) -> &str {
        "account"
    }

    fn about(&self) -> Option<&str> {
        Some("List lunr accounts")
    }

    fn global_options(&self) -> Vec<Opt> {
        vec![debug_option(), admin_option("the admin tenant-id")]
    }

    fn register(table: &mut CommandTable<Self>) {
        table.command("list", Account::list).opt(
            Opt::new(["-a", "--all"])
                .store_true()
                .help("display active and disabled accounts"),
        );
        table
            .command("get", Account::get)
            .about("List details for a specific tenant id")
            .opt(Opt::new(["id"]).help("tenant-id to get"))
            .opt(no_summary_option());
        table
            .command("create", Account::create)
            .about("Create a new tenant id")
            .opt(Opt::new(["id"]).help("tenant id to create"));
        table
            .command("delete", Account::delete)
            .about("Delete a tenant id")
            .opt(Opt::new(["id"]).help("tenant id to delete"));
    }

    fn pre_command(&mut self, globals: &LunrGlobals) -> Result<()> {
        self.shell.prepare(globals)?;
        let admin = self.shell.admin(globals)?;
        self.shell.connect(globals, Some(admin.as_str()))
    }
}

/// Manage lunr nodes
#[derive(Default)]
pub struct Node {
    shell: LunrShell,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let mut resp = self.shell.client()?.nodes().list(&Params::new())?;
        if !inv.args.flag("all") {
            resp = filter(&resp, "status", "ACTIVE");
        }

        if inv.args.flag("dsh") {
            for row in resp.rows() {
                println!("{}", row.get("name").and_then(key_of).unwrap_or_default());
            }
        } else {
            display(
                &resp,
                &["id", "name", "status", "volume_type_name", "hostname", "size"],
            );
        }
        Ok(Outcome::Done)
    }

    fn get(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let client = self.shell.client()?;
        let node = client.nodes().get(inv.args.require("id")?)?;
        display(&node, &[]);
        if inv.args.flag("no_summary") {
            return Ok(Outcome::Done);
        }

        let url = format!("http://{}:{}", node.field("hostname")?, node.field("port")?);
        let mut volumes = self.shell.storage(&url)?.volumes().list()?;

        if let Value::Array(rows) = &mut volumes.body {
            for row in rows.iter_mut() {
                let Value::Object(volume) = row else { continue };
                let gigs = volume
                    .get("size")
                    .and_then(|size| size.as_u64().or_else(|| size.as_str()?.parse().ok()))
                    .map(|bytes| bytes / (1024 * 1024 * 1024))
                    .unwrap_or_default();
                volume.insert("gigs".to_string(), json!(gigs));

                let tenant = match volume.get("id").and_then(key_of) {
                    Some(id) => match client.volumes().get(&id) {
                        Ok(found) => found.get("account_id").cloned().unwrap_or(Value::Null),
                        Err(e) if e.http_code() == Some(404) => json!("DELETING"),
                        Err(e) => return Err(e),
                    },
                    None => Value::Null,
                };
                volume.insert("tenant-id".to_string(), tenant);
            }
        }

        println!();
        display(&volumes, &["id", "tenant-id", "size", "gigs"]);
        summary_note("--no-summary");
        Ok(Outcome::Done)
    }

    fn create(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let name = inv
            .args
            .str("name")
            .map(str::to_string)
            .unwrap_or_else(new_id);
        let params = Params::from(&inv.args.without(&["name", "debug", "admin"]));
        reported(self.shell.client()?.nodes().create(&name, &params))
    }

    fn update(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let name = inv.args.require("name")?;
        let params = Params::from(&inv.args.without(&["name", "debug", "admin"]));
        reported(self.shell.client()?.nodes().update(name, &params))
    }

    fn delete(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let result = self.shell.client()?.nodes().delete(inv.args.require("id")?)?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }
}

impl CommandGroup for Node {
    type Globals = LunrGlobals;

    fn name(&self) -> &str {
        "node"
    }

    fn about(&self) -> Option<&str> {
        Some("Manage lunr nodes")
    }

    fn global_options(&self) -> Vec<Opt> {
        vec![debug_option(), admin_option("the admin tenant id")]
    }

    fn register(table: &mut CommandTable<Self>) {
        table
            .command("list", Node::list)
            .opt(
                Opt::new(["-s", "--dsh"])
                    .store_true()
                    .help("Output a list of storage node hostnames for use with dsh"),
            )
            .opt(
                Opt::new(["-a", "--all"])
                    .store_true()
                    .help("display active and disabled nodes"),
            );

        table
            .command("get", Node::get)
            .opt(Opt::new(["id"]).help("id that identifies the node"))
            .opt(no_summary_option());

        table
            .command("create", Node::create)
            .raw_args()
            .opt(Opt::new(["-n", "--name"]).help("name of the new node (defaults to uuid)"))
            .opt(Opt::new(["-s", "--size"]).required().help("size in GB"))
            .opt(
                Opt::new(["-t", "--volume-type-name"])
                    .required()
                    .help("type of storage (volume_type)"),
            )
            .opt(
                Opt::new(["-S", "--storage-hostname"])
                    .required()
                    .help("storage hostname"),
            )
            .opt(Opt::new(["-P", "--port"]).required().help("api port"))
            .opt(Opt::new(["-H", "--hostname"]).required().help("api hostname"));

        table
            .command("update", Node::update)
            .raw_args()
            .opt(Opt::new(["name"]).help("name of the node to update"))
            .opt(Opt::new(["-s", "--size"]).help("size in GB"))
            .opt(Opt::new(["--status"]).help("Node Status (ACTIVE, PENDING)"))
            .opt(Opt::new(["-t", "--volume-type-name"]).help("type of storage (volume_type)"))
            .opt(Opt::new(["-S", "--storage-hostname"]).help("storage hostname"))
            .opt(Opt::new(["-P", "--port"]).help("api port"))
            .opt(Opt::new(["-H", "--hostname"]).help("api hostname"));

        table
            .command("delete", Node::delete)
            .opt(Opt::new(["id"]).help("id that identifies the node"));
    }

    fn pre_command(&mut self, globals: &LunrGlobals) -> Result<()> {
        self.shell.prepare(globals)?;
        let admin = self.shell.admin(globals)?;
        self.shell.connect(globals, Some(admin.as_str()))
    }
}

/// Manage lunr exports
#[derive(Default)]
pub struct Export {
    shell: LunrShell,
}

impl Export {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let resp = self.shell.client()?.exports().create(
            inv.args.require("id")?,
            inv.args.str_or("ip", "0.0.0.0"),
            inv.args.str_or("initiator", ""),
        )?;
        display(&resp, &[]);
        Ok(Outcome::Done)
    }

    fn get(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let resp = self.shell.client()?.exports().get(inv.args.require("id")?)?;
        display(&resp, &[]);
        Ok(Outcome::Done)
    }

    fn delete(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let resp = self
            .shell
            .client()?
            .exports()
            .delete(inv.args.require("id")?, inv.args.flag("force"))?;
        display(&resp, &[]);
        Ok(Outcome::Done)
    }

    fn update(&mut self, inv: &Invocation<LunrGlobals>) -> Result<Outcome> {
        let id = inv.args.require("id")?;
        let params = Params::from(&inv.args.without(&["id", "debug", "tenant_id"]));
        reported(self.shell.client()?.exports().update(id, &params))
    }
}

impl CommandGroup for Export {
    type Globals = LunrGlobals;

    fn name(&self) -> &str {
        "export"
    }

    fn about(&self) -> Option<&str> {
        Some("Manage lunr exports")
    }

    fn global_options(&self) -> Vec<Opt> {
        vec![
            debug_option(),
            tenant_id_option("the tenant id that owns the exports"),
        ]
    }

    fn register(table: &mut CommandTable<Self>) {
        let initiator = || {
            Opt::new(["-I", "--initiator"])
                .help("the name of the initiator IE: iqn.2012-01-01.com.rackspace")
        };
        let ip = || Opt::new(["-i", "--ip"]).help("the ip address the initiator will connect from");

        table
            .command("create", Export::create)
            .opt(
                Opt::new(["id"])
                    .metavar("<VOLUME_ID>")
                    .help("id of the volume to export"),
            )
            .opt(ip())
            .opt(initiator());

        table
            .command("get", Export::get)
            .opt(Opt::new(["id"]).help("the exported volume id to show"));

        table
            .command("delete", Export::delete)
            .opt(Opt::new(["id"]).help("the exported volume id to delete"))
            .opt(
                Opt::new(["-f", "--force"])
                    .store_true()
                    .help("detach even if initiator is still connected"),
            );

        table
            .command("update", Export::update)
            .raw_args()
            .opt(Opt::new(["id"]).help("the exported volume id to update"))
            .opt(Opt::new(["--session-initiator"]))
            .opt(Opt::new(["--session-ip"]))
            .opt(Opt::new(["--mountpoint"]).help("mountpoint on the guest OS"))
            .opt(ip())
            .opt(initiator())
            .opt(Opt::new(["--instance-id"]).help("instance id"))
            .opt(Opt::new(["-s", "--status"]).help("export status (ATTACHING, ...)"));
    }

    fn pre_command(&mut self, globals: &LunrGlobals) -> Result<()> {
        self.shell.connect(globals, globals.tenant_id.as_deref())
    }
}

/// The `lunr` command groups
pub fn parser() -> DispatchResult<SubCommandParser> {
    SubCommandParser::new()
        .description(DESCRIPTION)
        .group(Backup::new())?
        .group(Volume::new())?
        .group(Env)?
        .group(Node::new())?
        .group(Export::new())?
        .group(Account::new())
}

/// Entry point of the `lunr` binary; returns the exit code
pub fn main(argv: Vec<String>) -> anyhow::Result<i32> {
    let (prog, args) = split_argv(argv, "lunr");
    let mut parser = parser().context("failed to register commands")?;
    Ok(finish(parser.run(&prog, args)))
}
