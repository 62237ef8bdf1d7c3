//! Option declarations and parsed argument values
//!
//! An [`Opt`] records everything needed to add one flag or positional to a
//! command parser. Options are replayed against a fresh `clap::Command` each
//! time a command is dispatched.

use crate::error::{DispatchError, DispatchResult};
use clap::builder::{PossibleValue, PossibleValuesParser};
use clap::{Arg, ArgAction, ArgMatches};
use std::collections::BTreeMap;
use std::fmt;

/// What the parser does when it sees an option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptAction {
    /// Take a value
    Store,
    /// Flag; `true` when present, `false` otherwise
    StoreTrue,
    /// Flag; the given constant when present, the declared default otherwise
    StoreConst(ArgValue),
}

/// A single parsed value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ArgValue {
    /// Not given on the command line and no declared default
    #[default]
    Unset,
    Bool(bool),
    Str(String),
}

impl ArgValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, ArgValue::Unset)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness: `true`, or a non-empty string
    pub fn is_true(&self) -> bool {
        match self {
            ArgValue::Unset => false,
            ArgValue::Bool(b) => *b,
            ArgValue::Str(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Unset => Ok(()),
            ArgValue::Bool(b) => write!(f, "{}", b),
            ArgValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Str(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Str(s)
    }
}

/// Replace hyphens with underscores
pub fn canonical(name: &str) -> String {
    name.replace('-', "_")
}

/// A declared command line option or positional argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opt {
    names: Vec<String>,
    help: Option<String>,
    default: Option<ArgValue>,
    required: bool,
    choices: Vec<String>,
    metavar: Option<String>,
    action: OptAction,
}

impl Opt {
    /// Declare an option from its names, e.g. `["-s", "--status"]` or `["id"]`
    ///
    /// A single name without a leading dash declares a positional argument.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Opt {
            names: names.into_iter().map(Into::into).collect(),
            help: None,
            default: None,
            required: false,
            choices: Vec::new(),
            metavar: None,
            action: OptAction::Store,
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn default(mut self, value: impl Into<ArgValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    pub fn store_true(mut self) -> Self {
        self.action = OptAction::StoreTrue;
        self
    }

    pub fn store_const(mut self, value: impl Into<ArgValue>) -> Self {
        self.action = OptAction::StoreConst(value.into());
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_positional(&self) -> bool {
        self.names.len() == 1 && !self.names[0].starts_with('-')
    }

    /// Key this option is stored under in a [`ParsedArgs`]
    ///
    /// The first long name wins, then the first short name, then the
    /// positional name; hyphens become underscores.
    pub fn dest(&self) -> String {
        let raw = self
            .names
            .iter()
            .find_map(|n| n.strip_prefix("--"))
            .or_else(|| self.names.iter().find_map(|n| n.strip_prefix('-')))
            .or_else(|| self.names.first().map(String::as_str))
            .unwrap_or_default();
        canonical(raw)
    }

    /// Check the declaration is something the parser can express
    pub fn validate(&self, command: &str) -> DispatchResult<()> {
        let invalid = |reason: &str| DispatchError::InvalidOption {
            command: command.to_string(),
            option: self.names.join("/"),
            reason: reason.to_string(),
        };

        if self.names.is_empty() {
            return Err(invalid("an option needs at least one name"));
        }

        if self.names.iter().any(|n| !n.starts_with('-')) {
            if self.names.len() > 1 {
                return Err(invalid("a positional argument takes exactly one name"));
            }
            if self.action != OptAction::Store {
                return Err(invalid("a positional argument must store a value"));
            }
            return Ok(());
        }

        for name in &self.names {
            if let Some(long) = name.strip_prefix("--") {
                if long.is_empty() {
                    return Err(invalid("empty long flag"));
                }
                if long == "help" {
                    return Err(invalid("--help is reserved"));
                }
            } else if let Some(short) = name.strip_prefix('-') {
                if short.chars().count() != 1 {
                    return Err(invalid("short flags take exactly one character"));
                }
                if short == "h" {
                    return Err(invalid("-h is reserved"));
                }
            }
        }

        if self.dest().is_empty() {
            return Err(invalid("option has no usable name"));
        }

        Ok(())
    }

    /// Flag strings this option occupies (`-s`, `--status`)
    pub(crate) fn flags(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .filter(|n| n.starts_with('-'))
            .map(String::as_str)
    }

    /// Build the clap argument for this option
    pub fn to_arg(&self) -> Arg {
        let dest = self.dest();
        let mut arg = Arg::new(dest.clone());

        if let Some(help) = &self.help {
            arg = arg.help(help.clone());
        }

        if self.is_positional() {
            arg = arg
                .value_name(self.value_name(&self.names[0]))
                .action(ArgAction::Set)
                .required(true);
            return self.with_choices(arg);
        }

        let mut long_seen = false;
        let mut short_seen = false;
        for name in &self.names {
            if let Some(long) = name.strip_prefix("--") {
                arg = if long_seen {
                    arg.visible_alias(long.to_string())
                } else {
                    arg.long(long.to_string())
                };
                long_seen = true;
            } else if let Some(c) = name.strip_prefix('-').and_then(|s| s.chars().next()) {
                arg = if short_seen {
                    arg.visible_short_alias(c)
                } else {
                    arg.short(c)
                };
                short_seen = true;
            }
        }

        match &self.action {
            OptAction::Store => {
                arg = arg
                    .action(ArgAction::Set)
                    .value_name(self.value_name(&dest.to_uppercase()))
                    .required(self.required);
                self.with_choices(arg)
            }
            OptAction::StoreTrue | OptAction::StoreConst(_) => arg.action(ArgAction::SetTrue),
        }
    }

    /// Metavar without its angle brackets; clap adds its own
    fn value_name(&self, fallback: &str) -> String {
        let name = self.metavar.as_deref().unwrap_or(fallback);
        name.trim_start_matches('<').trim_end_matches('>').to_string()
    }

    fn with_choices(&self, arg: Arg) -> Arg {
        if self.choices.is_empty() {
            return arg;
        }
        let values = self
            .choices
            .iter()
            .map(|c| PossibleValue::new(c.clone()));
        arg.value_parser(PossibleValuesParser::new(values))
    }

    /// Resolve this option's value from parser matches
    pub(crate) fn value_from(&self, matches: &ArgMatches) -> ArgValue {
        let dest = self.dest();
        let fallback = || self.default.clone().unwrap_or_default();

        match &self.action {
            OptAction::Store => matches
                .get_one::<String>(&dest)
                .cloned()
                .map(ArgValue::Str)
                .unwrap_or_else(fallback),
            OptAction::StoreTrue => {
                if matches.get_flag(&dest) {
                    ArgValue::Bool(true)
                } else {
                    self.default.clone().unwrap_or(ArgValue::Bool(false))
                }
            }
            OptAction::StoreConst(value) => {
                if matches.get_flag(&dest) {
                    value.clone()
                } else {
                    fallback()
                }
            }
        }
    }
}

/// Parsed arguments keyed by canonical name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedArgs {
    values: BTreeMap<String, ArgValue>,
}

impl ParsedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; the key is canonicalized
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<ArgValue>) {
        self.values.insert(canonical(key.as_ref()), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// String value, if one was given
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ArgValue::as_str)
    }

    /// String value with a fallback
    pub fn str_or<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.str(key).unwrap_or(fallback)
    }

    /// Truthiness of a value; missing keys are false
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(ArgValue::is_true)
    }

    /// String value that must be present
    pub fn require(&self, key: &str) -> DispatchResult<&str> {
        self.str(key)
            .ok_or_else(|| DispatchError::MissingArgument(key.to_string()))
    }

    /// Copy of this set without the named keys
    pub fn without(&self, keys: &[&str]) -> ParsedArgs {
        ParsedArgs {
            values: self
                .values
                .iter()
                .filter(|(k, _)| !keys.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl FromIterator<(String, ArgValue)> for ParsedArgs {
    fn from_iter<T: IntoIterator<Item = (String, ArgValue)>>(iter: T) -> Self {
        let mut args = ParsedArgs::new();
        for (k, v) in iter {
            args.insert(k, v);
        }
        args
    }
}

impl IntoIterator for ParsedArgs {
    type Item = (String, ArgValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ArgValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
