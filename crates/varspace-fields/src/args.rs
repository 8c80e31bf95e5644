//! Field construction arguments.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Positional and named arguments handed to a field factory.
///
/// The arguments are captured when a variable is declared and replayed each
/// time the variable is materialised onto a target type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldArgs {
    /// Positional arguments, in declaration order.
    #[serde(default)]
    pub args: Vec<Value>,

    /// Named arguments.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub kwargs: Map<String, Value>,
}

impl FieldArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments made of positional values only.
    pub fn positional<I, V>(args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            kwargs: Map::new(),
        }
    }

    /// Add a named argument.
    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }
}
