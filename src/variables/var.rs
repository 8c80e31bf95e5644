//! Variables, default values and local-namespace actions.

use serde_json::Value;
use std::sync::Arc;
use varspace_fields::{Field, FieldArgs, FieldError, FieldFactory};

/// Default value of a variable.
///
/// `Undefined` means no default is assigned. It is distinct from every real
/// value, `Value::Null` included.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DefaultValue {
    #[default]
    Undefined,
    Value(Value),
}

impl DefaultValue {
    pub fn is_defined(&self) -> bool {
        matches!(self, DefaultValue::Value(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            DefaultValue::Value(v) => Some(v),
            DefaultValue::Undefined => None,
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Value(value)
    }
}

impl From<Option<Value>> for DefaultValue {
    fn from(value: Option<Value>) -> Self {
        value.map_or(DefaultValue::Undefined, DefaultValue::Value)
    }
}

/// A variable declaration as written in a definition body.
///
/// The field kind is still a name here; it is resolved against the field
/// registry when the declaration is folded into a [`VarSpace`](super::VarSpace).
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub field_kind: String,
    pub args: FieldArgs,
    pub default: DefaultValue,
}

/// One action of a local namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Introduce a new variable.
    Declare(Declaration),
    /// Give an existing variable a new default.
    Define { name: String, value: Value },
    /// Reset an existing variable to undefined.
    Undefine { name: String },
}

impl Action {
    /// Name of the targeted variable.
    pub fn name(&self) -> &str {
        match self {
            Action::Declare(decl) => &decl.name,
            Action::Define { name, .. } | Action::Undefine { name } => name,
        }
    }

    pub fn is_declaration(&self) -> bool {
        matches!(self, Action::Declare(_))
    }
}

/// A declared variable inside a composed space.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    factory: Arc<dyn FieldFactory>,
    args: FieldArgs,
    default: DefaultValue,
    declared_in: String,
    defined_in: Option<String>,
}

impl Variable {
    /// Create an undefined variable declared by `declared_in`.
    pub fn new(
        name: impl Into<String>,
        factory: Arc<dyn FieldFactory>,
        args: FieldArgs,
        declared_in: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            factory,
            args,
            default: DefaultValue::Undefined,
            declared_in: declared_in.into(),
            defined_in: None,
        }
    }

    pub(crate) fn from_declaration(
        decl: &Declaration,
        factory: Arc<dyn FieldFactory>,
        definition: &str,
    ) -> Self {
        let mut var = Self::new(&decl.name, factory, decl.args.clone(), definition);
        if decl.default.is_defined() {
            var.set_default(decl.default.clone(), definition);
        }
        var
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind name of the field this variable is stored in.
    pub fn field_kind(&self) -> &str {
        self.factory.kind()
    }

    pub fn args(&self) -> &FieldArgs {
        &self.args
    }

    pub fn default(&self) -> &DefaultValue {
        &self.default
    }

    /// The default value, or `None` while undefined.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_value()
    }

    pub fn is_defined(&self) -> bool {
        self.default.is_defined()
    }

    pub fn define(&mut self, value: Value) {
        self.default = DefaultValue::Value(value);
    }

    pub fn undefine(&mut self) {
        self.default = DefaultValue::Undefined;
    }

    /// Definition whose body declared the variable.
    pub fn declared_in(&self) -> &str {
        &self.declared_in
    }

    /// Last definition that changed the default, if any did.
    pub fn defined_in(&self) -> Option<&str> {
        self.defined_in.as_deref()
    }

    /// Build a fresh storage field from the declared arguments.
    pub fn build_field(&self) -> Result<Box<dyn Field>, FieldError> {
        self.factory.build(&self.args)
    }

    pub(crate) fn set_default(&mut self, default: DefaultValue, definition: &str) {
        self.default = default;
        self.defined_in = Some(definition.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use varspace_fields::TypedFieldFactory;

    fn int_var() -> Variable {
        Variable::new(
            "v",
            Arc::new(TypedFieldFactory),
            FieldArgs::positional(["int"]),
            "Base",
        )
    }

    #[test]
    fn test_define_undefine_round_trip() {
        let mut var = int_var();
        assert!(!var.is_defined());
        assert_eq!(var.default_value(), None);

        var.define(json!(5));
        assert!(var.is_defined());
        assert_eq!(var.default_value(), Some(&json!(5)));

        var.undefine();
        assert!(!var.is_defined());
        var.undefine();
        assert!(!var.is_defined());
    }

    #[test]
    fn test_null_is_a_real_default() {
        let mut var = int_var();
        var.define(Value::Null);
        assert!(var.is_defined());
        assert_eq!(var.default_value(), Some(&Value::Null));
    }

    #[test]
    fn test_from_declaration_records_provenance() {
        let decl = Declaration {
            name: "timeout".to_string(),
            field_kind: "typed".to_string(),
            args: FieldArgs::positional(["int"]),
            default: json!(10).into(),
        };
        let var = Variable::from_declaration(&decl, Arc::new(TypedFieldFactory), "Base");
        assert_eq!(var.name(), "timeout");
        assert_eq!(var.field_kind(), "typed");
        assert_eq!(var.declared_in(), "Base");
        assert_eq!(var.defined_in(), Some("Base"));

        let bare = Declaration {
            default: DefaultValue::Undefined,
            ..decl
        };
        let var = Variable::from_declaration(&bare, Arc::new(TypedFieldFactory), "Base");
        assert_eq!(var.defined_in(), None);
    }

    #[test]
    fn test_build_field_validates() {
        let field = int_var().build_field().unwrap();
        assert!(field.validate(json!(1)).is_ok());
        assert!(field.validate(json!("1")).is_err());
    }

    #[test]
    fn test_action_name() {
        let action = Action::Undefine {
            name: "x".to_string(),
        };
        assert_eq!(action.name(), "x");
        assert!(!action.is_declaration());
    }

    #[test]
    fn test_default_value_from_option() {
        assert_eq!(DefaultValue::from(None::<Value>), DefaultValue::Undefined);
        assert_eq!(
            DefaultValue::from(Some(json!(1))),
            DefaultValue::Value(json!(1))
        );
    }
}
