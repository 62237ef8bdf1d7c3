//! Command groups and group-level dispatch
//!
//! A [`CommandGroup`] registers its commands once in a [`CommandTable`].
//! [`SubCommand`] wraps a group with that table and performs the per-call
//! work: pick the command out of the argument vector, build its parser, parse,
//! route the parsed values, run the pre-command hook and call the handler.

use crate::cli::option::{Opt, ParsedArgs};
use crate::error::{DispatchError, DispatchResult, Result};
use clap::Command;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

static COMMAND_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("command name pattern is valid")
});

static GROUP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("group name pattern is valid")
});

/// Handler function for one command
pub type Handler<G> =
    fn(&mut G, &Invocation<<G as CommandGroup>::Globals>) -> Result<Outcome>;

/// What a handler produced
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Finished; output was already written
    #[default]
    Done,
    /// Explicit process status
    Status(i32),
    /// A value for the caller; the process still exits 0
    Text(String),
}

impl Outcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Status(code) => *code,
            Outcome::Done | Outcome::Text(_) => 0,
        }
    }
}

impl From<i32> for Outcome {
    fn from(code: i32) -> Self {
        Outcome::Status(code)
    }
}

impl From<String> for Outcome {
    fn from(text: String) -> Self {
        Outcome::Text(text)
    }
}

impl From<&str> for Outcome {
    fn from(text: &str) -> Self {
        Outcome::Text(text.to_string())
    }
}

/// Typed view of a group's global options, built from leftover arguments
pub trait FromArgs: Sized {
    fn from_args(args: &ParsedArgs) -> Result<Self>;
}

impl FromArgs for () {
    fn from_args(_args: &ParsedArgs) -> Result<Self> {
        Ok(())
    }
}

impl FromArgs for ParsedArgs {
    fn from_args(args: &ParsedArgs) -> Result<Self> {
        Ok(args.clone())
    }
}

/// Everything a handler receives for one call
#[derive(Debug, Clone)]
pub struct Invocation<T> {
    /// Values for the command's own options (all parsed values for raw commands)
    pub args: ParsedArgs,
    /// The group's global options
    pub globals: T,
}

/// Usage information handed to [`CommandGroup::help`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupUsage {
    pub prog: String,
    pub name: String,
    pub about: Option<String>,
    pub commands: Vec<String>,
}

impl GroupUsage {
    pub fn render(&self) -> String {
        let mut out = format!("Usage: {} {} <command> [-h]\n\n", self.prog, self.name);
        if let Some(about) = &self.about {
            out.push_str(about.trim());
            out.push('\n');
        }
        out.push_str("\nAvailable Commands:\n");
        for name in &self.commands {
            out.push_str(&format!("   {}\n", name));
        }
        out
    }
}

/// A named collection of commands
pub trait CommandGroup: Sized {
    /// Global options as the hook and handlers see them
    type Globals: FromArgs;

    /// Token that selects this group on the command line
    fn name(&self) -> &str;

    fn about(&self) -> Option<&str> {
        None
    }

    /// Options added to every command's parser, after the command's own
    fn global_options(&self) -> Vec<Opt> {
        Vec::new()
    }

    /// Register this group's commands
    fn register(table: &mut CommandTable<Self>);

    /// Runs after parsing, before the handler
    fn pre_command(&mut self, _globals: &Self::Globals) -> Result<()> {
        Ok(())
    }

    /// Shown when no command matched
    fn help(&self, usage: &GroupUsage) -> Outcome {
        print!("{}", usage.render());
        Outcome::Status(1)
    }
}

/// One registered command
pub struct CommandSpec<G: CommandGroup> {
    name: String,
    about: Option<String>,
    options: Option<Vec<Opt>>,
    raw_args: bool,
    handler: Handler<G>,
}

impl<G: CommandGroup> CommandSpec<G> {
    pub fn about(&mut self, about: impl Into<String>) -> &mut Self {
        self.about = Some(about.into());
        self
    }

    /// Declare an option; declaration order is parser order
    pub fn opt(&mut self, opt: Opt) -> &mut Self {
        self.options.get_or_insert_with(Vec::new).push(opt);
        self
    }

    /// Mark the command as taking no options
    pub fn no_args(&mut self) -> &mut Self {
        self.options.get_or_insert_with(Vec::new);
        self
    }

    /// Hand the handler every parsed value instead of only its own options
    pub fn raw_args(&mut self) -> &mut Self {
        self.raw_args = true;
        self
    }

    pub fn options(&self) -> &[Opt] {
        self.options.as_deref().unwrap_or_default()
    }

    fn declared(&self) -> Vec<String> {
        self.options().iter().map(Opt::dest).collect()
    }
}

/// Registration table filled by [`CommandGroup::register`]
pub struct CommandTable<G: CommandGroup> {
    specs: Vec<CommandSpec<G>>,
}

impl<G: CommandGroup> CommandTable<G> {
    fn new() -> Self {
        CommandTable { specs: Vec::new() }
    }

    /// Register a command under its identifier, e.g. `update_status`
    ///
    /// The command is invoked as `update-status`. Declare its options on the
    /// returned spec, or call [`CommandSpec::no_args`].
    pub fn command(&mut self, name: &str, handler: Handler<G>) -> &mut CommandSpec<G> {
        let index = self.specs.len();
        self.specs.push(CommandSpec {
            name: name.to_string(),
            about: None,
            options: None,
            raw_args: false,
            handler,
        });
        &mut self.specs[index]
    }

    fn into_commands(
        self,
        group: &str,
        globals: &[Opt],
    ) -> DispatchResult<BTreeMap<String, CommandSpec<G>>> {
        let mut commands = BTreeMap::new();

        for spec in self.specs {
            if !COMMAND_NAME.is_match(&spec.name) {
                return Err(DispatchError::InvalidName(spec.name));
            }

            let Some(options) = &spec.options else {
                tracing::warn!(
                    group,
                    command = %spec.name,
                    "command declares no options and is not marked no_args; skipping"
                );
                continue;
            };

            for opt in options {
                opt.validate(&spec.name)?;
            }
            check_conflicts(&spec.name, options.iter().chain(globals))?;

            let external = spec.name.replace('_', "-");
            if commands.contains_key(&external) {
                return Err(DispatchError::DuplicateCommand {
                    group: group.to_string(),
                    command: external,
                });
            }
            commands.insert(external, spec);
        }

        Ok(commands)
    }
}

/// Two options may not share a destination or a flag string
fn check_conflicts<'a>(command: &str, options: impl Iterator<Item = &'a Opt>) -> DispatchResult<()> {
    let mut dests = HashSet::new();
    let mut flags = HashSet::new();

    for opt in options {
        let conflict = || DispatchError::OptionConflict {
            command: command.to_string(),
            option: opt.names().join("/"),
        };
        if !dests.insert(opt.dest()) {
            return Err(conflict());
        }
        for flag in opt.flags() {
            if !flags.insert(flag.to_string()) {
                return Err(conflict());
            }
        }
    }

    Ok(())
}

/// Build a parser for one command from its options and the group's globals
pub(crate) fn command_parser<'a>(
    name: &str,
    about: Option<&str>,
    options: impl IntoIterator<Item = &'a Opt>,
) -> Command {
    let mut cmd = Command::new(name.to_string()).infer_long_args(true);
    if let Some(about) = about {
        cmd = cmd.about(about.to_string());
    }
    for opt in options {
        cmd = cmd.arg(opt.to_arg());
    }
    cmd
}

/// Split parsed values between the handler and the group's global context
///
/// Returns `(accepted, leftovers)`. Raw commands get everything in both.
/// Otherwise the command's own options are accepted, minus unset values, and
/// every other key is a leftover.
pub(crate) fn route(
    declared: &[String],
    raw_args: bool,
    parsed: ParsedArgs,
) -> (ParsedArgs, ParsedArgs) {
    if raw_args {
        return (parsed.clone(), parsed);
    }

    let mut accepted = ParsedArgs::new();
    let mut leftovers = ParsedArgs::new();
    for (key, value) in parsed {
        if declared.iter().any(|d| *d == key) {
            if !value.is_unset() {
                accepted.insert(key, value);
            }
        } else {
            leftovers.insert(key, value);
        }
    }
    (accepted, leftovers)
}

/// Object-safe view of a group used by the top-level parser
pub trait Dispatch {
    fn name(&self) -> &str;

    /// External command names, sorted
    fn command_names(&self) -> Vec<&str>;

    /// Space separated command names for shell completion
    fn completion(&self) -> String {
        self.command_names().join(" ")
    }

    /// Render the group help text
    fn help_text(&self, prog: &str) -> String;

    /// Run a command from a group-stripped argument vector
    fn dispatch(&mut self, args: Vec<String>, prog: &str) -> Result<Outcome>;

    /// The group as a clap command tree, for completion script generation
    fn command_tree(&self) -> Command;
}

/// A command group together with its command table
pub struct SubCommand<G: CommandGroup> {
    group: G,
    name: String,
    globals: Vec<Opt>,
    commands: BTreeMap<String, CommandSpec<G>>,
}

impl<G: CommandGroup> SubCommand<G> {
    pub fn new(group: G) -> DispatchResult<Self> {
        let name = group.name().to_string();
        if name.is_empty() {
            return Err(DispatchError::MissingName);
        }
        if !GROUP_NAME.is_match(&name) {
            return Err(DispatchError::InvalidName(name));
        }

        let globals = group.global_options();
        for opt in &globals {
            opt.validate(&name)?;
        }
        check_conflicts(&name, globals.iter())?;

        let mut table = CommandTable::new();
        G::register(&mut table);
        let commands = table.into_commands(&name, &globals)?;

        Ok(SubCommand {
            group,
            name,
            globals,
            commands,
        })
    }

    pub fn group(&self) -> &G {
        &self.group
    }

    pub fn usage(&self, prog: &str) -> GroupUsage {
        GroupUsage {
            prog: prog.to_string(),
            name: self.name.clone(),
            about: self.group.about().map(str::to_string),
            commands: self.commands.keys().cloned().collect(),
        }
    }

    /// Show the group help
    pub fn help(&self, prog: &str) -> Outcome {
        self.group.help(&self.usage(prog))
    }

    /// Parse arguments for a command; keys are canonical
    pub fn parse_args(&self, command: &str, args: Vec<String>) -> Result<ParsedArgs> {
        let spec = self
            .commands
            .get(command)
            .ok_or_else(|| DispatchError::InvalidName(command.to_string()))?;

        let options: Vec<&Opt> = spec.options().iter().chain(&self.globals).collect();
        let parser = command_parser(command, spec.about.as_deref(), options.iter().copied())
            .no_binary_name(true);
        let matches = parser
            .try_get_matches_from(args)
            .map_err(DispatchError::from)?;

        Ok(options
            .iter()
            .map(|opt| (opt.dest(), opt.value_from(&matches)))
            .collect())
    }

    /// Parse, route, run the hook, and call the handler for one command
    pub fn call(&mut self, command: &str, args: Vec<String>, prog: &str) -> Result<Outcome> {
        let parsed = self.parse_args(command, args)?;

        let spec = self
            .commands
            .get(command)
            .ok_or_else(|| DispatchError::InvalidName(command.to_string()))?;
        let handler = spec.handler;
        let (args, leftovers) = route(&spec.declared(), spec.raw_args, parsed);

        let globals = G::Globals::from_args(&leftovers)?;
        let invocation = Invocation { args, globals };

        tracing::debug!(group = %self.name, command, "dispatching command");

        let result = self
            .group
            .pre_command(&invocation.globals)
            .and_then(|()| handler(&mut self.group, &invocation));

        result.map_err(|e| e.with_help(|| self.help_text(prog)))
    }
}

impl<G: CommandGroup> Dispatch for SubCommand<G> {
    fn name(&self) -> &str {
        &self.name
    }

    fn command_names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    fn help_text(&self, prog: &str) -> String {
        self.usage(prog).render()
    }

    fn dispatch(&mut self, mut args: Vec<String>, prog: &str) -> Result<Outcome> {
        let Some(index) = args.iter().position(|a| self.commands.contains_key(a)) else {
            return Ok(self.help(prog));
        };
        let command = args.remove(index);
        self.call(&command, args, prog)
    }

    fn command_tree(&self) -> Command {
        let mut tree = Command::new(self.name.clone());
        if let Some(about) = self.group.about() {
            tree = tree.about(about.trim().to_string());
        }
        for (name, spec) in &self.commands {
            tree = tree.subcommand(command_parser(
                name,
                spec.about.as_deref(),
                spec.options().iter().chain(&self.globals),
            ));
        }
        tree
    }
}
