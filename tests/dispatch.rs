//! Integration tests for command registration and dispatch

mod common;

use common::argv;
use lunrclient::cli::{
    CommandGroup, CommandTable, Dispatch, FromArgs, GroupUsage, Invocation, Opt, Outcome,
    ParsedArgs, SubCommand, SubCommandParser,
};
use lunrclient::error::DispatchError;
use lunrclient::{LunrError, Result};

#[derive(Debug, Default, Clone, PartialEq)]
struct ApiGlobals {
    debug: bool,
    tenant_id: Option<String>,
}

impl FromArgs for ApiGlobals {
    fn from_args(args: &ParsedArgs) -> Result<Self> {
        Ok(ApiGlobals {
            debug: args.flag("debug"),
            tenant_id: args.str("tenant_id").map(str::to_string),
        })
    }
}

struct Api {
    tenant_id: String,
    connected_as: Option<String>,
    seen: Vec<ParsedArgs>,
}

impl Default for Api {
    fn default() -> Self {
        Api {
            tenant_id: "configured".to_string(),
            connected_as: None,
            seen: Vec::new(),
        }
    }
}

impl Api {
    fn create(&mut self, inv: &Invocation<ApiGlobals>) -> Result<Outcome> {
        self.seen.push(inv.args.clone());
        Ok(Outcome::Text(format!("create: {}", inv.args.require("name")?)))
    }

    fn list(&mut self, _inv: &Invocation<ApiGlobals>) -> Result<Outcome> {
        Ok("listing".into())
    }

    fn copy(&mut self, inv: &Invocation<ApiGlobals>) -> Result<Outcome> {
        self.seen.push(inv.args.clone());
        Ok(Outcome::Text(format!(
            "{} -> {}",
            inv.args.require("src")?,
            inv.args.require("dest")?
        )))
    }

    fn update_status(&mut self, inv: &Invocation<ApiGlobals>) -> Result<Outcome> {
        self.seen.push(inv.args.clone());
        Ok(Outcome::Text(inv.args.require("status")?.to_string()))
    }

    fn query(&mut self, inv: &Invocation<ApiGlobals>) -> Result<Outcome> {
        self.seen.push(inv.args.clone());
        Ok(Outcome::Done)
    }

    fn fail(&mut self, _inv: &Invocation<ApiGlobals>) -> Result<Outcome> {
        Err(LunrError::shell("--name is required"))
    }
}

impl CommandGroup for Api {
    type Globals = ApiGlobals;

    fn name(&self) -> &str {
        "api"
    }

    fn about(&self) -> Option<&str> {
        Some("\n    Talk to the api\n    ")
    }

    fn global_options(&self) -> Vec<Opt> {
        vec![
            Opt::new(["-d", "--debug"]).store_const(true).default(false),
            Opt::new(["--tenant-id"]),
        ]
    }

    fn register(table: &mut CommandTable<Self>) {
        table
            .command("create", Api::create)
            .opt(Opt::new(["--name"]))
            .opt(Opt::new(["--size"]).default("1"));
        table.command("list", Api::list).no_args();
        table
            .command("copy", Api::copy)
            .opt(Opt::new(["src"]))
            .opt(Opt::new(["--account-id"]))
            .opt(Opt::new(["dest"]));
        table
            .command("update_status", Api::update_status)
            .opt(Opt::new(["--status"]).required().choices(["ACTIVE", "DELETED"]))
            .opt(Opt::new(["id"]));
        table
            .command("query", Api::query)
            .raw_args()
            .opt(Opt::new(["--node-id"]))
            .opt(Opt::new(["--status"]));
        table.command("fail", Api::fail).no_args();
    }

    fn pre_command(&mut self, globals: &ApiGlobals) -> Result<()> {
        self.connected_as = globals.tenant_id.clone();
        Ok(())
    }

    fn help(&self, _usage: &GroupUsage) -> Outcome {
        Outcome::Text("help".to_string())
    }
}

fn api() -> SubCommand<Api> {
    SubCommand::new(Api::default()).unwrap()
}

#[test]
fn test_create_with_name() {
    let mut group = api();
    let outcome = group.dispatch(argv("create --name derrick"), "lunr").unwrap();
    assert_eq!(outcome, Outcome::Text("create: derrick".to_string()));

    let seen = &group.group().seen[0];
    assert_eq!(seen.str("size"), Some("1"));
    assert!(!seen.contains_key("tenant_id"));
}

#[test]
fn test_options_in_any_order() {
    let mut group = api();
    group
        .dispatch(argv("--tenant-id t1 create --size 5 --name derrick"), "lunr")
        .unwrap();
    group
        .dispatch(argv("create --name derrick --size 5 --tenant-id t1"), "lunr")
        .unwrap();

    let seen = &group.group().seen;
    assert_eq!(seen[0], seen[1]);
    assert_eq!(group.group().connected_as.as_deref(), Some("t1"));
}

#[test]
fn test_positionals_follow_declaration_order() {
    let mut group = api();
    let outcome = group
        .dispatch(argv("copy vol1 --account-id acct1 vol2"), "lunr")
        .unwrap();
    assert_eq!(outcome, Outcome::Text("vol1 -> vol2".to_string()));
    assert_eq!(group.group().seen[0].str("account_id"), Some("acct1"));
}

#[test]
fn test_leftovers_do_not_clobber_group_state() {
    let mut group = api();
    group
        .dispatch(argv("create --name derrick --tenant-id other"), "lunr")
        .unwrap();
    assert_eq!(group.group().tenant_id, "configured");
    assert_eq!(group.group().connected_as.as_deref(), Some("other"));
}

#[test]
fn test_long_option_prefixes() {
    let mut group = api();
    let outcome = group
        .dispatch(argv("create --na derrick --tenant t1"), "lunr")
        .unwrap();
    assert_eq!(outcome, Outcome::Text("create: derrick".to_string()));
    assert_eq!(group.group().connected_as.as_deref(), Some("t1"));
}

#[test]
fn test_no_args_command() {
    let mut group = api();
    let outcome = group.dispatch(argv("list"), "lunr").unwrap();
    assert_eq!(outcome, Outcome::Text("listing".to_string()));
}

#[test]
fn test_underscore_command_is_hyphenated() {
    let mut group = api();
    assert!(group.command_names().contains(&"update-status"));

    let outcome = group
        .dispatch(argv("update-status --status ACTIVE vol1"), "lunr")
        .unwrap();
    assert_eq!(outcome, Outcome::Text("ACTIVE".to_string()));

    let outcome = group
        .dispatch(argv("update_status --status ACTIVE vol1"), "lunr")
        .unwrap();
    assert_eq!(outcome, Outcome::Text("help".to_string()));
}

#[test]
fn test_group_help_override_and_idempotence() {
    let mut group = api();
    let first = group.dispatch(argv("bogus"), "lunr").unwrap();
    let second = group.dispatch(Vec::new(), "lunr").unwrap();
    assert_eq!(first, second);

    assert_eq!(first, Outcome::Text("help".to_string()));

    assert_eq!(
        group.help_text("lunr"),
        "Usage: lunr api <command> [-h]\n\nTalk to the api\n\nAvailable Commands:\n   \
         copy\n   create\n   fail\n   list\n   query\n   update-status\n"
    );
}

#[test]
fn test_raw_args_receive_everything() {
    let mut group = api();
    group
        .dispatch(argv("query --status ACTIVE -d"), "lunr")
        .unwrap();

    let seen = &group.group().seen[0];
    assert_eq!(seen.str("status"), Some("ACTIVE"));
    assert!(seen.flag("debug"));
    assert!(seen.contains_key("node_id"));
    assert!(seen.contains_key("tenant_id"));
}

#[test]
fn test_bad_choice_is_a_usage_error() {
    let mut group = api();
    let err = group
        .dispatch(argv("update-status --status BOGUS vol1"), "lunr")
        .unwrap_err();
    assert!(matches!(
        err,
        LunrError::Dispatch(DispatchError::Usage(_))
    ));
}

#[test]
fn test_shell_error_carries_group_help() {
    let mut group = api();
    let err = group.dispatch(argv("fail"), "lunr").unwrap_err();
    match err {
        LunrError::Shell { message, help } => {
            assert_eq!(message, "--name is required");
            assert!(help.unwrap().contains("Available Commands:"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

struct Twice;

impl Twice {
    fn run(&mut self, _inv: &Invocation<()>) -> Result<Outcome> {
        Ok(Outcome::Done)
    }
}

impl CommandGroup for Twice {
    type Globals = ();

    fn name(&self) -> &str {
        "twice"
    }

    fn register(table: &mut CommandTable<Self>) {
        table.command("run", Twice::run).no_args();
        table.command("run", Twice::run).no_args();
    }
}

struct Nameless;

impl CommandGroup for Nameless {
    type Globals = ();

    fn name(&self) -> &str {
        ""
    }

    fn register(_table: &mut CommandTable<Self>) {}
}

struct Private;

impl Private {
    fn run(&mut self, _inv: &Invocation<()>) -> Result<Outcome> {
        Ok(Outcome::Done)
    }
}

impl CommandGroup for Private {
    type Globals = ();

    fn name(&self) -> &str {
        "private"
    }

    fn register(table: &mut CommandTable<Self>) {
        table.command("_private", Private::run).no_args();
    }
}

#[test]
fn test_registration_errors() {
    assert!(matches!(
        SubCommand::new(Twice),
        Err(DispatchError::DuplicateCommand { group, command }) if group == "twice" && command == "run"
    ));
    assert!(matches!(
        SubCommand::new(Nameless),
        Err(DispatchError::MissingName)
    ));
    assert!(matches!(
        SubCommand::new(Private),
        Err(DispatchError::InvalidName(name)) if name == "_private"
    ));
}

#[test]
fn test_parser_routes_to_group() {
    let mut parser = SubCommandParser::new()
        .description("Test api")
        .group(Api::default())
        .unwrap();

    let outcome = parser.run("lunr", argv("api create --name derrick")).unwrap();
    assert_eq!(outcome, Outcome::Text("create: derrick".to_string()));

    let outcome = parser.run("lunr", argv("api list")).unwrap();
    assert_eq!(outcome, Outcome::Text("listing".to_string()));

    let outcome = parser.run("lunr", argv("api")).unwrap();
    assert_eq!(outcome, Outcome::Text("help".to_string()));

    let outcome = parser.run("lunr", argv("nothing here")).unwrap();
    assert_eq!(outcome, Outcome::Status(1));
}
