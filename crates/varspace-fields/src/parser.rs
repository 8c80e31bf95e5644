//! Type expression parser.
//!
//! Parses strings such as `int`, `list[str]` or `dict[list[float]]` into a
//! [`ValueType`].

use crate::value_type::ValueType;

/// Scalar type keywords.
const SCALAR_TYPES: &[(&str, ValueType)] = &[
    ("any", ValueType::Any),
    ("none", ValueType::None),
    ("bool", ValueType::Bool),
    ("int", ValueType::Int),
    ("float", ValueType::Float),
    ("str", ValueType::Str),
];

/// Parse a type expression.
///
/// # Returns
/// The parsed type, or an error message naming the offending part.
pub fn parse_type_expr(expr: &str) -> Result<ValueType, String> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err("empty type expression".to_string());
    }

    // Parameterised container (e.g. list[int])
    if let Some(open) = expr.find('[') {
        if !expr.ends_with(']') {
            return Err(format!("unterminated type parameter in '{}'", expr));
        }
        let base = expr[..open].trim();
        let inner = parse_type_expr(&expr[open + 1..expr.len() - 1])?;
        return match base {
            "list" => Ok(ValueType::List(Some(Box::new(inner)))),
            "dict" => Ok(ValueType::Dict(Some(Box::new(inner)))),
            other => Err(format!("type '{}' does not take a parameter", other)),
        };
    }

    if expr.contains(']') {
        return Err(format!("unbalanced ']' in '{}'", expr));
    }

    match expr {
        "list" => return Ok(ValueType::List(None)),
        "dict" => return Ok(ValueType::Dict(None)),
        _ => {}
    }

    SCALAR_TYPES
        .iter()
        .find(|(name, _)| *name == expr)
        .map(|(_, t)| t.clone())
        .ok_or_else(|| format!("unknown type '{}'", expr))
}
