//! Top-level dispatch across command groups

use crate::cli::group::{CommandGroup, Dispatch, Outcome, SubCommand};
use crate::error::{DispatchError, DispatchResult, Result};
use clap::Command;
use clap_complete::Shell;
use std::path::Path;

const BASH_COMPLETION: &str = "--bash-completion";
const BASH_COMPLETION_SCRIPT: &str = "--bash-completion-script";
const COMPLETION_SCRIPT: &str = "--completion-script";

/// Holds the registered command groups and routes argv to one of them
#[derive(Default)]
pub struct SubCommandParser {
    groups: Vec<Box<dyn Dispatch>>,
    description: Option<String>,
}

impl SubCommandParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Register a command group; group names must be unique
    pub fn group<G>(self, group: G) -> DispatchResult<Self>
    where
        G: CommandGroup + 'static,
    {
        self.dispatcher(Box::new(SubCommand::new(group)?))
    }

    /// Register an already constructed dispatcher
    pub fn dispatcher(mut self, group: Box<dyn Dispatch>) -> DispatchResult<Self> {
        if self.find(group.name()).is_some() {
            return Err(DispatchError::DuplicateGroup(group.name().to_string()));
        }
        self.groups.push(group);
        Ok(self)
    }

    /// Group names in registration order
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name()).collect()
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name() == name)
    }

    /// Dispatch an argument vector that excludes the program name
    pub fn run(&mut self, prog: &str, mut args: Vec<String>) -> Result<Outcome> {
        if let Some(index) = args.iter().position(|a| a == BASH_COMPLETION) {
            println!("{}", self.bash_completion(&args[index..]));
            return Ok(Outcome::Status(0));
        }

        if args.iter().any(|a| a == BASH_COMPLETION_SCRIPT) {
            print!("{}", bash_completion_script(prog));
            return Ok(Outcome::Status(0));
        }

        if let Some(index) = args.iter().position(|a| a == COMPLETION_SCRIPT) {
            let shell = args.get(index + 1).map(String::as_str).unwrap_or("bash");
            print!("{}", self.completion_script(shell, prog)?);
            return Ok(Outcome::Status(0));
        }

        let found = args
            .iter()
            .enumerate()
            .find_map(|(index, arg)| self.find(arg).map(|group| (index, group)));

        match found {
            Some((index, group)) => {
                args.remove(index);
                tracing::debug!(group = %self.groups[group].name(), "dispatching group");
                self.groups[group].dispatch(args, prog)
            }
            None => {
                print!("{}", self.help_text(prog));
                Ok(Outcome::Status(1))
            }
        }
    }

    /// Candidate tokens for `--bash-completion <prog> [group] ...`
    ///
    /// `request` starts at the `--bash-completion` token.
    pub fn bash_completion(&self, request: &[String]) -> String {
        if let Some(group) = request.get(2).and_then(|name| self.find(name)) {
            return self.groups[group].completion();
        }
        self.group_names().join(" ")
    }

    /// Full completion script for `shell`, generated from the command tree
    pub fn completion_script(&self, shell: &str, prog: &str) -> Result<String> {
        let shell: Shell = shell
            .parse()
            .map_err(|_| DispatchError::UnknownShell(shell.to_string()))?;

        let mut cmd = self.command_tree(prog);
        let mut buf = Vec::new();
        clap_complete::generate(shell, &mut cmd, prog.to_string(), &mut buf);
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Every group and command as one clap command tree
    pub fn command_tree(&self, prog: &str) -> Command {
        let mut tree = Command::new(prog.to_string());
        if let Some(description) = &self.description {
            tree = tree.about(description.clone());
        }
        tree.subcommands(self.groups.iter().map(|g| g.command_tree()))
    }

    pub fn help_text(&self, prog: &str) -> String {
        let mut out = format!("Usage: {} <command> [-h]\n\n", prog);
        if let Some(description) = &self.description {
            out.push_str(description);
            out.push_str("\n\n");
        }
        out.push_str("Available Commands:\n");
        for name in self.group_names() {
            out.push_str(&format!("   {}\n", name));
        }
        out
    }
}

/// Shell function that feeds `--bash-completion` into bash completion
pub fn bash_completion_script(prog: &str) -> String {
    format!(
        "_{prog}() {{\n  \
           local cur=\"${{COMP_WORDS[COMP_CWORD]}}\"\n  \
           local list=$({prog} --bash-completion $COMP_LINE)\n  \
           COMPREPLY=($(compgen -W \"$list\" $cur))\n\
         }}\n\
         complete -F _{prog} {prog}\n"
    )
}

/// Program name as shown in usage text: the file name of argv[0]
pub fn program_name(arg0: &str) -> String {
    Path::new(arg0)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| arg0.to_string())
}
