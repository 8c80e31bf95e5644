//! Field and field factory contracts.

use serde_json::Value;
use std::fmt;

use crate::args::FieldArgs;
use crate::error::FieldError;

/// Validated storage for one variable.
///
/// A field is bound to a target type under the variable's name and every
/// write to an instance slot goes through [`Field::validate`].
pub trait Field: Send + Sync + fmt::Debug {
    /// Kind name of the factory that built this field.
    fn kind(&self) -> &str;

    /// Check `value` and return what should be stored.
    fn validate(&self, value: Value) -> Result<Value, FieldError>;
}

/// Builds fields of one kind from declaration arguments.
pub trait FieldFactory: Send + Sync + fmt::Debug {
    /// Kind name under which the factory is registered.
    fn kind(&self) -> &str;

    fn build(&self, args: &FieldArgs) -> Result<Box<dyn Field>, FieldError>;
}

/// Kind name of [`AnyField`].
pub const ANY_KIND: &str = "any";

/// Field accepting every value unchanged.
#[derive(Debug, Clone, Default)]
pub struct AnyField;

impl Field for AnyField {
    fn kind(&self) -> &str {
        ANY_KIND
    }

    fn validate(&self, value: Value) -> Result<Value, FieldError> {
        Ok(value)
    }
}

/// Factory for [`AnyField`]. Takes no arguments.
#[derive(Debug, Clone, Default)]
pub struct AnyFieldFactory;

impl FieldFactory for AnyFieldFactory {
    fn kind(&self) -> &str {
        ANY_KIND
    }

    fn build(&self, args: &FieldArgs) -> Result<Box<dyn Field>, FieldError> {
        if !args.is_empty() {
            return Err(FieldError::invalid_args(ANY_KIND, "takes no arguments"));
        }
        Ok(Box::new(AnyField))
    }
}
