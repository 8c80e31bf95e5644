//! Configuration errors.

use crate::error::VarSpaceError;

/// Errors from loading settings or definition files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A loaded definition was rejected by the registry.
    #[error(transparent)]
    Registration(#[from] VarSpaceError),
}
