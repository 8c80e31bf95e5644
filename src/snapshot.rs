//! Composition summary (JSON and human output)

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DefinitionSource;
use crate::error::VarSpaceError;
use crate::registry::DefinitionRegistry;
use crate::variables::{DigestError, Instance, TypeLayout, VariableSnapshot};

/// Schema version for composition summaries
pub const SUMMARY_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for composition summaries
pub const SUMMARY_SCHEMA_ID: &str = "varspace/compose@1";

/// Composed namespace of one definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionSummary {
    pub name: String,

    pub parents: Vec<String>,

    /// Digest of the composed namespace
    pub digest: String,

    pub variables: IndexMap<String, VariableSnapshot>,
}

/// Composition summary over a set of registered definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeSummary {
    pub schema_version: u32,

    pub schema_id: String,

    pub created_at: DateTime<Utc>,

    /// Definition files that were loaded
    pub sources: Vec<DefinitionSource>,

    pub definitions: Vec<DefinitionSummary>,
}

impl ComposeSummary {
    /// Summarise registered definitions, or only `only` when given.
    pub fn from_registry(
        registry: &DefinitionRegistry,
        sources: Vec<DefinitionSource>,
        only: Option<&str>,
    ) -> Result<Self, SummaryError> {
        let names: Vec<&str> = match only {
            Some(name) if registry.var_space(name).is_none() => {
                return Err(VarSpaceError::UnknownDefinition(name.to_string()).into());
            }
            Some(name) => vec![name],
            None => registry.definitions().collect(),
        };

        let mut definitions = Vec::with_capacity(names.len());
        for name in names {
            let (Some(space), Some(definition)) =
                (registry.var_space(name), registry.definition(name))
            else {
                return Err(VarSpaceError::UnknownDefinition(name.to_string()).into());
            };
            definitions.push(DefinitionSummary {
                name: name.to_string(),
                parents: definition.parents().to_vec(),
                digest: space.digest()?,
                variables: space.snapshot(),
            });
        }

        Ok(Self {
            schema_version: SUMMARY_SCHEMA_VERSION,
            schema_id: SUMMARY_SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            sources,
            definitions,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// One block per definition, one line per variable.
    pub fn to_human(&self) -> String {
        let mut out = String::new();
        for def in &self.definitions {
            if def.parents.is_empty() {
                out.push_str(&format!("{}\n", def.name));
            } else {
                out.push_str(&format!("{} ({})\n", def.name, def.parents.join(", ")));
            }
            for (name, var) in &def.variables {
                let value = var
                    .value
                    .as_ref()
                    .map(Value::to_string)
                    .unwrap_or_else(|| "<undefined>".to_string());
                out.push_str(&format!(
                    "  {} [{}] = {}  (declared in {})\n",
                    name, var.field, value, var.declared_in
                ));
            }
        }
        out
    }
}

/// One slot of an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSummary {
    /// Whether the slot holds a value (a stored `null` counts)
    pub set: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Values held by one instance, in slot order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub definition: String,

    pub values: IndexMap<String, SlotSummary>,
}

impl InstanceSummary {
    pub fn new(layout: &TypeLayout, instance: &Instance) -> Self {
        Self {
            definition: instance.definition().to_string(),
            values: layout
                .entries(instance)
                .map(|(name, value)| {
                    let slot = SlotSummary {
                        set: value.is_some(),
                        value: value.cloned(),
                    };
                    (name.to_string(), slot)
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_human(&self) -> String {
        let mut out = format!("{}\n", self.definition);
        for (name, slot) in &self.values {
            if slot.set {
                let value = slot.value.as_ref().unwrap_or(&Value::Null);
                out.push_str(&format!("  {} = {}\n", name, value));
            } else {
                out.push_str(&format!("  {} unset\n", name));
            }
        }
        out
    }
}

/// Errors building a summary.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error(transparent)]
    VarSpace(#[from] VarSpaceError),

    #[error(transparent)]
    Digest(#[from] DigestError),
}
