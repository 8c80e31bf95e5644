//! Validated storage fields for varspace variables.
//!
//! A field is the storage slot a variable is materialised into. Fields are
//! built by a [`FieldFactory`] looked up by kind name in a [`FieldRegistry`],
//! and validate every value written through them.

mod args;
mod error;
mod field;
mod parser;
mod registry;
mod typed;
mod value_type;

pub use args::FieldArgs;
pub use error::FieldError;
pub use field::{AnyField, AnyFieldFactory, Field, FieldFactory, ANY_KIND};
pub use parser::parse_type_expr;
pub use registry::FieldRegistry;
pub use typed::{TypedField, TypedFieldFactory, TYPED_KIND};
pub use value_type::{describe, ValueType};
