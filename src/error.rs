//! Error types for lunrclient

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for lunrclient operations
pub type Result<T> = std::result::Result<T, LunrError>;

/// Main error type for lunrclient
#[derive(Error, Debug)]
pub enum LunrError {
    /// Command registration and argument parsing errors
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Settings errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The API answered with a non-200 status
    #[error("{message}")]
    Http { message: String, code: u16 },

    /// Client side failure (transport, bad arguments to an API call, ...)
    #[error("{0}")]
    Client(String),

    /// The command was invoked incorrectly; the group help is shown with it
    #[error("{message}")]
    Shell {
        message: String,
        help: Option<String>,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LunrError {
    /// Build a shell usage error; the dispatcher attaches the group help
    pub fn shell(message: impl Into<String>) -> Self {
        LunrError::Shell {
            message: message.into(),
            help: None,
        }
    }

    /// Build a generic client error
    pub fn client(message: impl Into<String>) -> Self {
        LunrError::Client(message.into())
    }

    /// HTTP status code carried by this error, if any
    pub fn http_code(&self) -> Option<u16> {
        match self {
            LunrError::Http { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Attach group help to a shell error that has none yet
    pub(crate) fn with_help(self, help: impl FnOnce() -> String) -> Self {
        match self {
            LunrError::Shell {
                message,
                help: None,
            } => LunrError::Shell {
                message,
                help: Some(help()),
            },
            other => other,
        }
    }
}

impl From<reqwest::Error> for LunrError {
    fn from(e: reqwest::Error) -> Self {
        LunrError::Client(e.to_string())
    }
}

/// Command registration and dispatch errors
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("command group has no name; give every command group a name")]
    MissingName,

    #[error("'{0}' is not a valid command name")]
    InvalidName(String),

    #[error("command group '{0}' is registered more than once")]
    DuplicateGroup(String),

    #[error("command '{command}' is registered more than once in group '{group}'")]
    DuplicateCommand { group: String, command: String },

    #[error("invalid option '{option}' on '{command}': {reason}")]
    InvalidOption {
        command: String,
        option: String,
        reason: String,
    },

    #[error("option '{option}' on '{command}' conflicts with another option")]
    OptionConflict { command: String, option: String },

    #[error("'{0}' is a required argument")]
    MissingArgument(String),

    #[error("unknown shell '{0}'")]
    UnknownShell(String),

    /// Raised by the argument parser; carries its own usage text and exit code
    #[error("{0}")]
    Usage(#[from] clap::Error),
}

/// Settings loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read config file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} not set in environment, and is required for Auth query")]
    MissingEnv(String),
}

/// Specialized result type for dispatch operations
pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
