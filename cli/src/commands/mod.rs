//! CLI command implementations
//!
//! Each command module implements one resquery subcommand.

pub mod explain;
pub mod resolve;
pub mod url;
