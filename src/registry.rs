//! Definition registry.
//!
//! Registers definitions in dependency order, composing each one's variable
//! space from its parents' spaces and its own local space, and creates
//! instances by injecting the composed space.

use indexmap::IndexMap;
use std::collections::BTreeSet;
use varspace_fields::FieldRegistry;

use crate::error::VarSpaceError;
use crate::report::{LogSink, ReportSink};
use crate::variables::{Instance, LocalVarSpace, TypeLayout, VarSpace};

/// A definition awaiting registration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definition {
    name: String,
    parents: Vec<String>,
    members: BTreeSet<String>,
    local: LocalVarSpace,
}

impl Definition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a parent. Parents are joined in the order they are added.
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Add a member the definition defines outside its variables.
    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.members.insert(name.into());
        self
    }

    pub fn with_local(mut self, local: LocalVarSpace) -> Self {
        self.local = local;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    pub fn local(&self) -> &LocalVarSpace {
        &self.local
    }
}

#[derive(Debug)]
struct Entry {
    definition: Definition,
    space: VarSpace,
    layout: TypeLayout,
}

/// Registered definitions with their composed spaces and layouts.
pub struct DefinitionRegistry {
    fields: FieldRegistry,
    entries: IndexMap<String, Entry>,
    sink: Box<dyn ReportSink>,
}

impl DefinitionRegistry {
    /// A registry using the built-in field kinds and reporting to `log`.
    pub fn new() -> Self {
        Self::with_fields(FieldRegistry::with_builtins())
    }

    pub fn with_fields(fields: FieldRegistry) -> Self {
        Self {
            fields,
            entries: IndexMap::new(),
            sink: Box::new(LogSink),
        }
    }

    /// Replace the reporting sink.
    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Compose, check and store `definition`.
    ///
    /// Every parent must already be registered. The target layout inherits
    /// the members visible on the parents' layouts. Nothing is stored when
    /// an error is returned.
    pub fn register(&mut self, definition: Definition) -> Result<&VarSpace, VarSpaceError> {
        match self.compose(&definition) {
            Ok((space, layout)) => {
                self.sink.info(&format!(
                    "registered '{}' ({} parent(s), {} variable(s))",
                    definition.name,
                    definition.parents.len(),
                    space.len()
                ));
                let name = definition.name.clone();
                let entry = Entry {
                    definition,
                    space,
                    layout,
                };
                let (index, _) = self.entries.insert_full(name, entry);
                Ok(&self.entries[index].space)
            }
            Err(err) => {
                self.sink.warn(&format!(
                    "rejected '{}': {} [{}]",
                    definition.name,
                    err,
                    err.code()
                ));
                Err(err)
            }
        }
    }

    fn compose(&self, definition: &Definition) -> Result<(VarSpace, TypeLayout), VarSpaceError> {
        let name = definition.name();
        if self.entries.contains_key(name) {
            return Err(VarSpaceError::DuplicateDefinition(name.to_string()));
        }

        let mut parents = Vec::with_capacity(definition.parents.len());
        for parent in &definition.parents {
            let entry = self
                .entries
                .get(parent)
                .ok_or_else(|| VarSpaceError::UnknownDefinition(parent.clone()))?;
            parents.push(entry);
        }

        let layout = parents.iter().fold(
            TypeLayout::new(name).with_members(definition.members.iter().cloned()),
            |layout, parent| layout.inherit(&parent.layout),
        );

        let space = VarSpace::compose(
            parents.iter().map(|p| &p.space),
            &definition.local,
            &self.fields,
            name,
        )?;
        space.sanity(&layout, name, None)?;
        Ok((space, layout))
    }

    /// Create an instance of a registered definition.
    pub fn instantiate(&mut self, name: &str) -> Result<Instance, VarSpaceError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| VarSpaceError::UnknownDefinition(name.to_string()))?;

        let mut instance = Instance::new(name);
        if let Err(err) = entry.space.inject(&mut instance, &mut entry.layout) {
            self.sink
                .warn(&format!("cannot instantiate '{}': {}", name, err));
            return Err(err);
        }

        self.sink.debug(&format!(
            "instantiated '{}' ({} of {} variable(s) set)",
            name,
            instance.set_count(),
            entry.space.len()
        ));
        Ok(instance)
    }

    pub fn var_space(&self, name: &str) -> Option<&VarSpace> {
        self.entries.get(name).map(|e| &e.space)
    }

    pub fn layout(&self, name: &str) -> Option<&TypeLayout> {
        self.entries.get(name).map(|e| &e.layout)
    }

    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.entries.get(name).map(|e| &e.definition)
    }

    /// Registered definition names, in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DefinitionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
