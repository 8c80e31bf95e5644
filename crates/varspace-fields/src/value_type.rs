//! Value types understood by [`TypedField`](crate::TypedField).

use serde_json::Value;
use std::fmt;

/// Shape of a JSON value accepted by a typed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Any,
    None,
    Bool,
    /// Integral numbers only.
    Int,
    /// Any number, integral or not.
    Float,
    Str,
    /// A list, optionally with a typed element.
    List(Option<Box<ValueType>>),
    /// A string-keyed map, optionally with a typed value.
    Dict(Option<Box<ValueType>>),
}

impl ValueType {
    /// Whether `value` has this shape.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::Any, _) => true,
            (ValueType::None, Value::Null) => true,
            (ValueType::Bool, Value::Bool(_)) => true,
            (ValueType::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (ValueType::Float, Value::Number(_)) => true,
            (ValueType::Str, Value::String(_)) => true,
            (ValueType::List(elem), Value::Array(items)) => match elem {
                Some(t) => items.iter().all(|v| t.matches(v)),
                None => true,
            },
            (ValueType::Dict(elem), Value::Object(map)) => match elem {
                Some(t) => map.values().all(|v| t.matches(v)),
                None => true,
            },
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Any => write!(f, "any"),
            ValueType::None => write!(f, "none"),
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::Str => write!(f, "str"),
            ValueType::List(None) => write!(f, "list"),
            ValueType::List(Some(t)) => write!(f, "list[{}]", t),
            ValueType::Dict(None) => write!(f, "dict"),
            ValueType::Dict(Some(t)) => write!(f, "dict[{}]", t),
        }
    }
}

/// Short name for the shape of a concrete value, used in error messages.
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "none",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
