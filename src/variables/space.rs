//! Composed variable space of a definition.
//!
//! A [`VarSpace`] starts empty, joins the spaces of the definition's parents
//! and is then extended with the definition's own [`LocalVarSpace`]. The
//! result is checked against the target type with [`VarSpace::sanity`]
//! before it is used for injection.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use thiserror::Error;
use varspace_fields::{FieldArgs, FieldError, FieldRegistry};

use super::layout::TypeLayout;
use super::local::LocalVarSpace;
use super::var::{Action, DefaultValue, Variable};
use crate::error::VarSpaceError;

/// Merged variables of a definition and its ancestors.
#[derive(Debug, Clone, Default)]
pub struct VarSpace {
    pub(super) vars: IndexMap<String, Variable>,
    pub(super) injected: BTreeSet<String>,
}

impl VarSpace {
    /// An empty space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Join every parent space in order, then extend with `local`.
    pub fn compose<'a, I>(
        parents: I,
        local: &LocalVarSpace,
        fields: &FieldRegistry,
        definition: &str,
    ) -> Result<Self, VarSpaceError>
    where
        I: IntoIterator<Item = &'a VarSpace>,
    {
        let mut space = Self::new();
        for parent in parents {
            space.join(parent, definition)?;
        }
        space.extend(local, fields, definition)?;
        Ok(space)
    }

    /// Merge the variables of a parent space into this one.
    ///
    /// A name already present here means the variable is reachable from more
    /// than one parent, which is rejected. The injected names of `other` are
    /// carried over. Nothing changes when an error is returned.
    pub fn join(&mut self, other: &VarSpace, definition: &str) -> Result<(), VarSpaceError> {
        if let Some(name) = other.vars.keys().find(|k| self.vars.contains_key(*k)) {
            return Err(VarSpaceError::DuplicateDeclaration {
                name: name.clone(),
                definition: definition.to_string(),
            });
        }

        for (name, var) in &other.vars {
            self.vars.insert(name.clone(), var.clone());
        }
        self.injected.extend(other.injected.iter().cloned());
        debug!(
            "joined {} variable(s) into '{}'",
            other.vars.len(),
            definition
        );
        Ok(())
    }

    /// Fold the local space of `definition` into this one.
    ///
    /// Declarations add new variables, resolving their field kind in
    /// `fields` and checking that the field can be built from the declared
    /// arguments. Defines, undefines and bare assignments change the default
    /// of an existing variable. Nothing changes when an error is returned.
    pub fn extend(
        &mut self,
        local: &LocalVarSpace,
        fields: &FieldRegistry,
        definition: &str,
    ) -> Result<(), VarSpaceError> {
        local.check_exclusive(definition)?;

        let mut vars = self.vars.clone();
        for action in local.actions() {
            match action {
                Action::Declare(decl) => {
                    if vars.contains_key(&decl.name) {
                        return Err(VarSpaceError::Redeclaration {
                            name: decl.name.clone(),
                            definition: definition.to_string(),
                        });
                    }

                    let invalid = |source: FieldError| VarSpaceError::InvalidFieldType {
                        name: decl.name.clone(),
                        definition: definition.to_string(),
                        source,
                    };
                    let factory = fields.resolve(&decl.field_kind).map_err(invalid)?;
                    factory.build(&decl.args).map_err(invalid)?;

                    vars.insert(
                        decl.name.clone(),
                        Variable::from_declaration(decl, factory, definition),
                    );
                }
                Action::Define { name, value } => {
                    declared(&mut vars, name, definition)?
                        .set_default(DefaultValue::Value(value.clone()), definition);
                }
                Action::Undefine { name } => {
                    declared(&mut vars, name, definition)?
                        .set_default(DefaultValue::Undefined, definition);
                }
            }
        }

        for (name, value) in local.assignments() {
            declared(&mut vars, name, definition)?
                .set_default(DefaultValue::Value(value.clone()), definition);
        }

        debug!(
            "extended '{}': {} action(s), {} assignment(s), {} variable(s) total",
            definition,
            local.actions().len(),
            local.assignments().len(),
            vars.len()
        );
        self.vars = vars;
        Ok(())
    }

    /// Check that no variable clashes with an unrelated member of `layout`.
    ///
    /// `reserved` defaults to every member name visible on the layout. A
    /// variable may only share its name with a variable slot that was itself
    /// injected from this space; plain members of the type or its ancestors
    /// always clash.
    pub fn sanity(
        &self,
        layout: &TypeLayout,
        definition: &str,
        reserved: Option<&BTreeSet<String>>,
    ) -> Result<(), VarSpaceError> {
        let members;
        let reserved = match reserved {
            Some(names) => names,
            None => {
                members = layout.member_names();
                &members
            }
        };

        for name in self.vars.keys() {
            let own_slot = self.injected.contains(name) && layout.is_variable_slot(name);
            if reserved.contains(name) && !own_slot {
                return Err(VarSpaceError::NameClash {
                    name: name.clone(),
                    definition: definition.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Variables in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Names that have been materialised onto a target type.
    pub fn injected(&self) -> &BTreeSet<String> {
        &self.injected
    }

    pub fn is_injected(&self, name: &str) -> bool {
        self.injected.contains(name)
    }

    /// Serialisable view of the variables, in declaration order.
    pub fn snapshot(&self) -> IndexMap<String, VariableSnapshot> {
        self.vars
            .iter()
            .map(|(name, var)| (name.clone(), VariableSnapshot::from(var)))
            .collect()
    }

    /// SHA-256 hex digest of the canonical JSON of [`VarSpace::snapshot`].
    ///
    /// Two spaces with the same variables, fields and defaults share a digest
    /// regardless of provenance bookkeeping such as the injected names.
    pub fn digest(&self) -> Result<String, DigestError> {
        let jcs_bytes = serde_json_canonicalizer::to_vec(&self.snapshot())
            .map_err(|e| DigestError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&jcs_bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}

fn declared<'a>(
    vars: &'a mut IndexMap<String, Variable>,
    name: &str,
    definition: &str,
) -> Result<&'a mut Variable, VarSpaceError> {
    vars.get_mut(name)
        .ok_or_else(|| VarSpaceError::UndeclaredVariable {
            name: name.to_string(),
            definition: definition.to_string(),
        })
}

/// Serialisable view of a [`Variable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSnapshot {
    /// Field kind name.
    pub field: String,

    /// Field construction arguments.
    pub args: FieldArgs,

    /// Whether a default value is set.
    pub defined: bool,

    /// The default value, when defined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Definition that declared the variable.
    pub declared_in: String,

    /// Last definition that changed the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in: Option<String>,
}

impl From<&Variable> for VariableSnapshot {
    fn from(var: &Variable) -> Self {
        Self {
            field: var.field_kind().to_string(),
            args: var.args().clone(),
            defined: var.is_defined(),
            value: var.default_value().cloned(),
            declared_in: var.declared_in().to_string(),
            defined_in: var.defined_in().map(str::to_string),
        }
    }
}

/// The snapshot could not be canonicalised.
#[derive(Debug, Error)]
#[error("cannot canonicalize variable space: {0}")]
pub struct DigestError(String);
