//! Client settings
//!
//! Settings come from built-in defaults, an optional `lunr.yml` file and the
//! environment, in that order of precedence.

pub mod parse;
pub mod schema;
pub mod settings;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use settings::*;
pub use types::*;
