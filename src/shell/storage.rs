//! The `storage` program: direct access to one storage node

use crate::cli::{
    CommandGroup, CommandTable, FromArgs, Invocation, Opt, Outcome, ParsedArgs, SubCommandParser,
};
use crate::client::{ClientOptions, CloneSource, StorageClient};
use crate::config::Settings;
use crate::display::display;
use crate::error::{DispatchResult, LunrError, Result};
use crate::shell::{debug_option, env::Env, finish, split_argv};
use anyhow::Context;

const DESCRIPTION: &str = "Command line interface to the lunr storage api";
const STORAGE_PORT: u16 = 8081;

/// Global options of the storage groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageGlobals {
    pub debug: bool,
    pub host: Option<String>,
}

impl FromArgs for StorageGlobals {
    fn from_args(args: &ParsedArgs) -> Result<Self> {
        Ok(StorageGlobals {
            debug: args.flag("debug"),
            host: args.str("host").map(str::to_string),
        })
    }
}

/// State shared by every storage group; settings are read on first use
pub struct StorageShell {
    settings: Settings,
    pending: bool,
    client: Option<StorageClient>,
}

impl StorageShell {
    pub fn new() -> Self {
        StorageShell {
            settings: Settings::default(),
            pending: true,
            client: None,
        }
    }

    pub fn with_settings(settings: Settings) -> Self {
        StorageShell {
            settings,
            pending: false,
            client: None,
        }
    }

    /// `http://<host>:8081` when a host is given, else the configured URL
    pub fn url_for(&self, globals: &StorageGlobals) -> String {
        match &globals.host {
            Some(host) => format!("http://{}:{}", host, STORAGE_PORT),
            None => self.settings.storage_url().to_string(),
        }
    }

    fn connect(&mut self, globals: &StorageGlobals) -> Result<()> {
        if self.pending {
            self.settings = Settings::load()?;
            self.pending = false;
        }
        let options = ClientOptions::default()
            .timeout(self.settings.timeout)
            .debug(globals.debug);
        let url = self.url_for(globals);
        tracing::debug!(url = %url, "connecting to storage node");
        self.client = Some(StorageClient::new(&url, &options)?);
        Ok(())
    }

    pub fn client(&self) -> Result<&StorageClient> {
        self.client
            .as_ref()
            .ok_or_else(|| LunrError::client("no storage client; the pre-command hook did not run"))
    }
}

impl Default for StorageShell {
    fn default() -> Self {
        Self::new()
    }
}

fn storage_globals() -> Vec<Opt> {
    vec![
        debug_option(),
        Opt::new(["-H", "--host"]).help("hostname or ip for the storage node"),
    ]
}

/// Direct interface with the lunr storage volume api
#[derive(Default)]
pub struct Volume {
    shell: StorageShell,
}

impl Volume {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&mut self, _inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        let result = self.shell.client()?.volumes().list()?;
        display(&result, &["id", "path", "size"]);
        Ok(Outcome::Done)
    }

    fn get(&mut self, inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        let result = self.shell.client()?.volumes().get(inv.args.require("id")?)?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }

    fn create(&mut self, inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        let result = self
            .shell
            .client()?
            .volumes()
            .create(inv.args.require("size")?, inv.args.str("id"))?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }

    fn clone(&mut self, inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        let args = &inv.args;
        let source = CloneSource {
            volume_id: args.str("src"),
            backup_id: args.str("backup"),
            host: args.str("src_host"),
        };

        if source.volume_id.is_none() && source.backup_id.is_none() {
            return Err(LunrError::shell("options --src or --backup are required"));
        }
        let size = args
            .str("size")
            .filter(|size| !size.is_empty())
            .ok_or_else(|| LunrError::shell("size is required"))?;
        if source.volume_id.is_some() && source.host.is_none() {
            return Err(LunrError::shell("--src-host is required when using --src"));
        }

        let result = self
            .shell
            .client()?
            .volumes()
            .clone(&source, size, args.str("id"))?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }

    fn delete(&mut self, inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        let result = self.shell.client()?.volumes().delete(inv.args.require("id")?)?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }

    fn audit(&mut self, inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        let result = self.shell.client()?.volumes().audit(inv.args.require("id")?)?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }

    fn lock(&mut self, inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        let result = self.shell.client()?.volumes().lock(inv.args.require("id")?)?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }
}

impl CommandGroup for Volume {
    type Globals = StorageGlobals;

    fn name(&self) -> &str {
        "volume"
    }

    fn about(&self) -> Option<&str> {
        Some("Direct interface with the lunr storage volume api")
    }

    fn global_options(&self) -> Vec<Opt> {
        storage_globals()
    }

    fn register(table: &mut CommandTable<Self>) {
        table.command("list", Volume::list).no_args();
        table
            .command("get", Volume::get)
            .opt(Opt::new(["id"]).help("volume id to get"));
        table
            .command("create", Volume::create)
            .opt(Opt::new(["--id"]).help("volume id to identify the volume"))
            .opt(Opt::new(["size"]).help("size of the new volume (in gigabytes)"));
        table
            .command("clone", Volume::clone)
            .opt(Opt::new(["--id"]).help("volume id to identify the new volume"))
            .opt(Opt::new(["--src"]).help("volume id to clone from"))
            .opt(Opt::new(["--src-host"]).help("storage node hosting the --src volume"))
            .opt(Opt::new(["--backup"]).help("backup id to retrieve from"))
            .opt(Opt::new(["size"]).help(
                "size of the new volume (must be the same or larger than the original backup)",
            ));
        table
            .command("delete", Volume::delete)
            .opt(Opt::new(["id"]).help("volume id to delete"));
        table
            .command("audit", Volume::audit)
            .opt(Opt::new(["id"]).help("volume id to audit"));
        table
            .command("lock", Volume::lock)
            .opt(Opt::new(["id"]).help("volume id to get lock info from"));
    }

    fn pre_command(&mut self, globals: &StorageGlobals) -> Result<()> {
        self.shell.connect(globals)
    }
}

/// Direct interface with the lunr storage backup api
#[derive(Default)]
pub struct Backup {
    shell: StorageShell,
}

impl Backup {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&mut self, inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        let result = self.shell.client()?.backups().list(inv.args.require("src")?)?;
        println!("{}", serde_json::to_string_pretty(&result.body)?);
        Ok(Outcome::Done)
    }

    fn get(&mut self, inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        let result = self
            .shell
            .client()?
            .backups()
            .get(inv.args.require("src")?, inv.args.require("id")?)?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }

    fn create(&mut self, inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        let result = self.shell.client()?.backups().create(
            inv.args.require("src")?,
            inv.args.str("id"),
            inv.args.str("timestamp"),
        )?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }

    fn delete(&mut self, inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        let result = self
            .shell
            .client()?
            .backups()
            .delete(inv.args.require("src")?, inv.args.require("id")?)?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }
}

impl CommandGroup for Backup {
    type Globals = StorageGlobals;

    fn name(&self) -> &str {
        "backup"
    }

    fn about(&self) -> Option<&str> {
        Some("Direct interface with the lunr storage backup api")
    }

    fn global_options(&self) -> Vec<Opt> {
        storage_globals()
    }

    fn register(table: &mut CommandTable<Self>) {
        table.command("list", Backup::list).opt(
            Opt::new(["src"])
                .metavar("<src-volume-id>")
                .help("list all backups for specified volume id"),
        );
        let src = |help: &str| Opt::new(["src"]).metavar("<src-volume-id>").help(help);
        let id = || Opt::new(["id"]).metavar("<backup-id>").help("backup id");
        table
            .command("get", Backup::get)
            .opt(src("volume id"))
            .opt(id());
        table
            .command("create", Backup::create)
            .opt(Opt::new(["--timestamp"]).help("timestamp of the snapshot"))
            .opt(Opt::new(["--id"]).help("id of the new backup"))
            .opt(src("volume id to backup"));
        table
            .command("delete", Backup::delete)
            .opt(src("volume id"))
            .opt(id());
    }

    fn pre_command(&mut self, globals: &StorageGlobals) -> Result<()> {
        self.shell.connect(globals)
    }
}

/// Access to the status api on a storage node
#[derive(Default)]
pub struct Status {
    shell: StorageShell,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&mut self, _inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        display(&self.shell.client()?.status().list()?, &[]);
        Ok(Outcome::Done)
    }

    fn api(&mut self, _inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        display(&self.shell.client()?.status().api()?, &[]);
        Ok(Outcome::Done)
    }

    fn conf(&mut self, _inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        display(&self.shell.client()?.status().conf()?, &[]);
        Ok(Outcome::Done)
    }
}

impl CommandGroup for Status {
    type Globals = StorageGlobals;

    fn name(&self) -> &str {
        "status"
    }

    fn about(&self) -> Option<&str> {
        Some("Access to the status api on a storage node")
    }

    fn global_options(&self) -> Vec<Opt> {
        storage_globals()
    }

    fn register(table: &mut CommandTable<Self>) {
        table.command("list", Status::list).no_args();
        table.command("api", Status::api).no_args();
        table.command("conf", Status::conf).no_args();
    }

    fn pre_command(&mut self, globals: &StorageGlobals) -> Result<()> {
        self.shell.connect(globals)
    }
}

/// Direct interface with the lunr storage export api
#[derive(Default)]
pub struct Export {
    shell: StorageShell,
}

impl Export {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&mut self, inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        display(
            &self.shell.client()?.exports().get(inv.args.require("id")?)?,
            &[],
        );
        Ok(Outcome::Done)
    }

    fn create(&mut self, inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        let result = self
            .shell
            .client()?
            .exports()
            .create(inv.args.require("id")?, inv.args.str("ip"))?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }

    fn delete(&mut self, inv: &Invocation<StorageGlobals>) -> Result<Outcome> {
        let result = self
            .shell
            .client()?
            .exports()
            .delete(inv.args.require("id")?, inv.args.flag("force"))?;
        display(&result, &[]);
        Ok(Outcome::Done)
    }
}

impl CommandGroup for Export {
    type Globals = StorageGlobals;

    fn name(&self) -> &str {
        "export"
    }

    fn about(&self) -> Option<&str> {
        Some("Direct interface with the lunr storage export api")
    }

    fn global_options(&self) -> Vec<Opt> {
        storage_globals()
    }

    fn register(table: &mut CommandTable<Self>) {
        table
            .command("get", Export::get)
            .opt(Opt::new(["id"]).help("the exported volume id to show"));
        table
            .command("create", Export::create)
            .opt(
                Opt::new(["-i", "--ip"])
                    .help("the ip address that will connect to the export"),
            )
            .opt(Opt::new(["id"]).help("the volume id to export"));
        table
            .command("delete", Export::delete)
            .opt(
                Opt::new(["-f", "--force"])
                    .store_true()
                    .help("detach even if initiator is still connected"),
            )
            .opt(Opt::new(["id"]).help("the exported volume id to delete"));
    }

    fn pre_command(&mut self, globals: &StorageGlobals) -> Result<()> {
        self.shell.connect(globals)
    }
}

/// The `storage` command groups
pub fn parser() -> DispatchResult<SubCommandParser> {
    SubCommandParser::new()
        .description(DESCRIPTION)
        .group(Backup::new())?
        .group(Volume::new())?
        .group(Env)?
        .group(Status::new())?
        .group(Export::new())
}

/// Entry point of the `storage` binary; returns the exit code
pub fn main(argv: Vec<String>) -> anyhow::Result<i32> {
    let (prog, args) = split_argv(argv, "storage");
    let mut parser = parser().context("failed to register commands")?;
    Ok(finish(parser.run(&prog, args)))
}
