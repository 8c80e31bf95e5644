//! Type-checked field.

use serde_json::Value;

use crate::args::FieldArgs;
use crate::error::FieldError;
use crate::field::{Field, FieldFactory};
use crate::parser::parse_type_expr;
use crate::value_type::{describe, ValueType};

/// Kind name of [`TypedField`].
pub const TYPED_KIND: &str = "typed";

/// Field accepting values that match at least one of its types.
#[derive(Debug, Clone)]
pub struct TypedField {
    types: Vec<ValueType>,
    allow_none: bool,
}

impl TypedField {
    pub fn new(types: Vec<ValueType>, allow_none: bool) -> Self {
        Self { types, allow_none }
    }

    pub fn types(&self) -> &[ValueType] {
        &self.types
    }

    fn expected(&self) -> String {
        let mut names: Vec<String> = self.types.iter().map(|t| t.to_string()).collect();
        if self.allow_none {
            names.push("none".to_string());
        }
        names.join(" | ")
    }
}

impl Field for TypedField {
    fn kind(&self) -> &str {
        TYPED_KIND
    }

    fn validate(&self, value: Value) -> Result<Value, FieldError> {
        if value.is_null() && self.allow_none {
            return Ok(value);
        }
        if self.types.iter().any(|t| t.matches(&value)) {
            return Ok(value);
        }
        Err(FieldError::TypeMismatch {
            expected: self.expected(),
            found: describe(&value).to_string(),
        })
    }
}

/// Factory for [`TypedField`].
///
/// Positional arguments are type expressions; at least one is required.
/// The only named argument is `allow_none`.
#[derive(Debug, Clone, Default)]
pub struct TypedFieldFactory;

impl FieldFactory for TypedFieldFactory {
    fn kind(&self) -> &str {
        TYPED_KIND
    }

    fn build(&self, args: &FieldArgs) -> Result<Box<dyn Field>, FieldError> {
        if args.args.is_empty() {
            return Err(FieldError::invalid_args(
                TYPED_KIND,
                "at least one type is required",
            ));
        }

        let mut types = Vec::with_capacity(args.args.len());
        for arg in &args.args {
            let expr = arg.as_str().ok_or_else(|| {
                FieldError::invalid_args(
                    TYPED_KIND,
                    format!("type must be given as a string, got {}", describe(arg)),
                )
            })?;
            let parsed =
                parse_type_expr(expr).map_err(|e| FieldError::invalid_args(TYPED_KIND, e))?;
            types.push(parsed);
        }

        let mut allow_none = false;
        for (key, value) in &args.kwargs {
            match (key.as_str(), value) {
                ("allow_none", Value::Bool(b)) => allow_none = *b,
                ("allow_none", other) => {
                    return Err(FieldError::invalid_args(
                        TYPED_KIND,
                        format!("allow_none must be a bool, got {}", describe(other)),
                    ));
                }
                (other, _) => {
                    return Err(FieldError::invalid_args(
                        TYPED_KIND,
                        format!("unexpected argument '{}'", other),
                    ));
                }
            }
        }

        Ok(Box::new(TypedField::new(types, allow_none)))
    }
}
