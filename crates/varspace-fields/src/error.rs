//! Field error types.

use thiserror::Error;

/// Errors raised while building a field or validating a value against it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    /// No factory is registered under this kind name.
    #[error("unknown field kind '{0}'")]
    UnknownKind(String),

    /// The construction arguments do not suit the field kind.
    #[error("invalid arguments for field '{kind}': {reason}")]
    InvalidArgs { kind: String, reason: String },

    /// A value was rejected by the field's type check.
    #[error("expected a value of type {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
}

impl FieldError {
    /// Shorthand for an `InvalidArgs` error.
    pub fn invalid_args(kind: &str, reason: impl Into<String>) -> Self {
        FieldError::InvalidArgs {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }
}
