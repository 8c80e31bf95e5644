//! Errors raised while composing, checking or materialising variable spaces.
//!
//! Every variant rejects a definition outright: no partially composed space
//! is kept when one of these is returned.

use thiserror::Error;
use varspace_fields::FieldError;

/// Variable space errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VarSpaceError {
    /// The same variable is reachable through more than one parent.
    #[error("variable '{name}' is declared in more than one of the parents of '{definition}'")]
    DuplicateDeclaration { name: String, definition: String },

    /// An inherited variable is declared again.
    #[error("cannot redeclare variable '{name}' in '{definition}'")]
    Redeclaration { name: String, definition: String },

    /// A define, undefine or assignment targets an unknown variable.
    #[error("variable '{name}' has not been declared (in '{definition}')")]
    UndeclaredVariable { name: String, definition: String },

    /// More than one action on a variable in a single definition body.
    #[error("cannot specify more than one action on variable '{name}' in '{definition}'")]
    MultipleActions { name: String, definition: String },

    /// A variable name collides with an unrelated member of the target type.
    #[error("'{name}' already defined in '{definition}'")]
    NameClash { name: String, definition: String },

    /// The declared field kind or its arguments are not usable.
    #[error("invalid field for variable '{name}' in '{definition}': {source}")]
    InvalidFieldType {
        name: String,
        definition: String,
        #[source]
        source: FieldError,
    },

    /// A default value was rejected by its field.
    #[error("invalid default value for variable '{name}' in '{definition}': {source}")]
    InvalidDefaultValue {
        name: String,
        definition: String,
        #[source]
        source: FieldError,
    },

    /// A definition with this name is already registered.
    #[error("definition '{0}' is already registered")]
    DuplicateDefinition(String),

    /// No definition with this name is registered.
    #[error("unknown definition '{0}'")]
    UnknownDefinition(String),
}

impl VarSpaceError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateDeclaration { .. } => "DUPLICATE_DECLARATION",
            Self::Redeclaration { .. } => "REDECLARATION",
            Self::UndeclaredVariable { .. } => "UNDECLARED_VARIABLE",
            Self::MultipleActions { .. } => "MULTIPLE_ACTIONS",
            Self::NameClash { .. } => "NAME_CLASH",
            Self::InvalidFieldType { .. } => "INVALID_FIELD_TYPE",
            Self::InvalidDefaultValue { .. } => "INVALID_DEFAULT_VALUE",
            Self::DuplicateDefinition(_) => "DUPLICATE_DEFINITION",
            Self::UnknownDefinition(_) => "UNKNOWN_DEFINITION",
        }
    }

    /// Variable the error is about, if any.
    pub fn variable(&self) -> Option<&str> {
        match self {
            Self::DuplicateDeclaration { name, .. }
            | Self::Redeclaration { name, .. }
            | Self::UndeclaredVariable { name, .. }
            | Self::MultipleActions { name, .. }
            | Self::NameClash { name, .. }
            | Self::InvalidFieldType { name, .. }
            | Self::InvalidDefaultValue { name, .. } => Some(name),
            Self::DuplicateDefinition(_) | Self::UnknownDefinition(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = VarSpaceError::MultipleActions {
            name: "y".to_string(),
            definition: "Leaf".to_string(),
        };
        assert_eq!(err.code(), "MULTIPLE_ACTIONS");
        assert_eq!(err.variable(), Some("y"));
        assert_eq!(
            VarSpaceError::UnknownDefinition("Nope".to_string()).code(),
            "UNKNOWN_DEFINITION"
        );
    }

    #[test]
    fn test_messages_name_definition() {
        let err = VarSpaceError::DuplicateDeclaration {
            name: "x".to_string(),
            definition: "Child".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "variable 'x' is declared in more than one of the parents of 'Child'"
        );
    }

    #[test]
    fn test_field_error_is_source() {
        use std::error::Error as _;

        let err = VarSpaceError::InvalidDefaultValue {
            name: "x".to_string(),
            definition: "Base".to_string(),
            source: FieldError::TypeMismatch {
                expected: "int".to_string(),
                found: "str".to_string(),
            },
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("expected a value of type int"));
    }
}
