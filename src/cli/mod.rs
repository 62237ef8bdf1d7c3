//! Sub-command dispatch
//!
//! Groups register commands and their options explicitly; the top-level
//! parser picks a group from argv and the group picks a command, builds a
//! parser for it and routes the parsed values to the handler.

pub mod group;
pub mod option;
pub mod parser;

// Re-export main types
pub use group::{
    CommandGroup, CommandSpec, CommandTable, Dispatch, FromArgs, GroupUsage, Handler, Invocation,
    Outcome, SubCommand,
};
pub use option::{canonical, ArgValue, Opt, OptAction, ParsedArgs};
pub use parser::{bash_completion_script, program_name, SubCommandParser};
