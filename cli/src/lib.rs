//! resquery CLI - inspect selector resolution and URL filters against a schema
//!
//! The schema is described in a `resquery.toml` file (see [`config`]).
//!
//! # Commands
//!
//! - `resquery resolve <table> <selector>...` - Show the column and joins a selector resolves to
//! - `resquery explain <table> --query <q> --field <selector>...` - Show the plan for a URL query
//! - `resquery url <table> <q>` - Normalize a URL query through the filters it parses to

pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use config::{Config, ConfigError};
pub use error::CliError;
