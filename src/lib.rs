//! Lunrclient - command line client for the Lunr block storage API
//!
//! Provides the sub-command dispatcher, HTTP clients for the Lunr API and
//! its storage nodes, and the `lunr` and `storage` programs built on them.

// Public modules
pub mod cli;
pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod shell;

// Re-export commonly used types
pub use error::{LunrError, Result};

/// Current version of lunrclient
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
