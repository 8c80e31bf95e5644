//! Local variable space of a single definition body.

use serde_json::Value;
use std::collections::HashSet;
use varspace_fields::FieldArgs;

use super::var::{Action, Declaration, DefaultValue};
use crate::error::VarSpaceError;

/// Declarations and actions authored directly in one definition.
///
/// Nothing is validated while the space is being built; conflicts are
/// reported when it is folded into a [`VarSpace`](super::VarSpace).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalVarSpace {
    actions: Vec<Action>,
    assignments: Vec<(String, Value)>,
}

impl LocalVarSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable without a default value.
    pub fn declare(
        self,
        name: impl Into<String>,
        field_kind: impl Into<String>,
        args: FieldArgs,
    ) -> Self {
        self.push(Action::Declare(Declaration {
            name: name.into(),
            field_kind: field_kind.into(),
            args,
            default: DefaultValue::Undefined,
        }))
    }

    /// Declare a variable with a default value.
    pub fn declare_with_value(
        self,
        name: impl Into<String>,
        field_kind: impl Into<String>,
        args: FieldArgs,
        value: impl Into<Value>,
    ) -> Self {
        self.push(Action::Declare(Declaration {
            name: name.into(),
            field_kind: field_kind.into(),
            args,
            default: DefaultValue::Value(value.into()),
        }))
    }

    /// Set a new default on an inherited variable.
    pub fn define(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(Action::Define {
            name: name.into(),
            value: value.into(),
        })
    }

    /// Reset an inherited variable to undefined.
    pub fn undefine(self, name: impl Into<String>) -> Self {
        self.push(Action::Undefine { name: name.into() })
    }

    /// Record a bare assignment in the definition body.
    ///
    /// Behaves like `define`, except that it may also target a variable
    /// declared in the same body.
    pub fn assign(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assignments.push((name.into(), value.into()));
        self
    }

    pub fn push(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Explicit actions, in authoring order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Bare assignments, in authoring order.
    pub fn assignments(&self) -> &[(String, Value)] {
        &self.assignments
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.assignments.is_empty()
    }

    /// Reject any name targeted by more than one action.
    ///
    /// Only a declaration followed by a bare assignment of the same name is
    /// allowed. The outcome does not depend on the order of the entries.
    pub(crate) fn check_exclusive(&self, definition: &str) -> Result<(), VarSpaceError> {
        let clash = |name: &str| VarSpaceError::MultipleActions {
            name: name.to_string(),
            definition: definition.to_string(),
        };

        let mut acted: HashSet<&str> = HashSet::new();
        let mut declared: HashSet<&str> = HashSet::new();
        for action in &self.actions {
            if !acted.insert(action.name()) {
                return Err(clash(action.name()));
            }
            if action.is_declaration() {
                declared.insert(action.name());
            }
        }

        let mut assigned: HashSet<&str> = HashSet::new();
        for (name, _) in &self.assignments {
            let name = name.as_str();
            if !assigned.insert(name) {
                return Err(clash(name));
            }
            if acted.contains(name) && !declared.contains(name) {
                return Err(clash(name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn int() -> FieldArgs {
        FieldArgs::positional(["int"])
    }

    #[test]
    fn test_builder_keeps_order() {
        let local = LocalVarSpace::new()
            .declare("a", "typed", int())
            .define("b", 2)
            .undefine("c")
            .assign("d", 4);

        let names: Vec<&str> = local.actions().iter().map(Action::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(local.assignments(), &[("d".to_string(), json!(4))]);
        assert!(!local.is_empty());
        assert!(LocalVarSpace::new().is_empty());
    }

    #[test]
    fn test_distinct_names_are_fine() {
        let local = LocalVarSpace::new()
            .declare("a", "typed", int())
            .define("b", 2)
            .assign("c", 3);
        assert!(local.check_exclusive("T").is_ok());
    }

    #[test]
    fn test_declare_then_assign_is_allowed() {
        let local = LocalVarSpace::new()
            .declare("a", "typed", int())
            .assign("a", 1);
        assert!(local.check_exclusive("T").is_ok());
    }

    #[test]
    fn test_define_and_undefine_clash() {
        let local = LocalVarSpace::new().define("a", 1).undefine("a");
        let err = local.check_exclusive("T").unwrap_err();
        assert_eq!(err.code(), "MULTIPLE_ACTIONS");
    }

    #[test]
    fn test_assign_and_undefine_clash_in_any_order() {
        let first = LocalVarSpace::new().assign("y", 1).undefine("y");
        let second = LocalVarSpace::new().undefine("y").assign("y", 1);
        assert_eq!(first.check_exclusive("T").unwrap_err().code(), "MULTIPLE_ACTIONS");
        assert_eq!(second.check_exclusive("T").unwrap_err().code(), "MULTIPLE_ACTIONS");
    }

    #[test]
    fn test_declare_and_define_clash() {
        let local = LocalVarSpace::new()
            .declare("a", "typed", int())
            .define("a", 1);
        assert!(local.check_exclusive("T").is_err());
    }

    #[test]
    fn test_double_declare_clash() {
        let local = LocalVarSpace::new()
            .declare("a", "typed", int())
            .declare("a", "any", FieldArgs::new());
        assert!(local.check_exclusive("T").is_err());
    }

    #[test]
    fn test_double_assign_clash() {
        let local = LocalVarSpace::new().assign("a", 1).assign("a", 2);
        let err = local.check_exclusive("Leaf").unwrap_err();
        assert_eq!(
            err,
            VarSpaceError::MultipleActions {
                name: "a".to_string(),
                definition: "Leaf".to_string(),
            }
        );
    }
}
