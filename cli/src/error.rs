//! Error types for the CLI

use resquery::error::QueryError;
use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resolution or compilation error
    #[error(transparent)]
    Query(#[from] QueryError),
}
