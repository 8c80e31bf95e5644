//! Target type layouts and instance storage.
//!
//! A [`TypeLayout`] plays the part of a class: it knows the member names a
//! definition exposes and owns one bound field per materialised variable.
//! Slots live in an arena indexed by [`SlotId`], with a name lookup on the
//! side. An [`Instance`] only stores values, indexed the same way; reads and
//! writes go through the layout so every write is validated by the slot's
//! field.

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use varspace_fields::{Field, FieldError};

/// Index of a bound slot within a [`TypeLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Errors from named slot access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("'{type_name}' has no variable slot named '{name}'")]
    UnknownSlot { type_name: String, name: String },

    #[error(transparent)]
    Invalid(#[from] FieldError),
}

#[derive(Debug)]
struct Slot {
    name: String,
    field: Box<dyn Field>,
}

/// Member table of a target type.
#[derive(Debug, Default)]
pub struct TypeLayout {
    name: String,
    members: BTreeSet<String>,
    inherited: BTreeSet<String>,
    inherited_slots: BTreeSet<String>,
    slots: Vec<Slot>,
    index: HashMap<String, SlotId>,
}

impl TypeLayout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add members the type defines itself (methods, plain attributes).
    pub fn with_members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members.extend(members.into_iter().map(Into::into));
        self
    }

    /// Make every member visible on `parent` visible here too.
    ///
    /// Plain members and variable slots stay apart: a slot bound on the
    /// parent is inherited as a slot.
    pub fn inherit(mut self, parent: &TypeLayout) -> Self {
        self.inherited.extend(parent.members.iter().cloned());
        self.inherited.extend(parent.inherited.iter().cloned());
        self.inherited_slots.extend(parent.inherited_slots.iter().cloned());
        self.inherited_slots.extend(parent.index.keys().cloned());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every member name visible on the type: own, inherited and bound slots.
    pub fn member_names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self.members.union(&self.inherited).cloned().collect();
        names.extend(self.inherited_slots.iter().cloned());
        names.extend(self.index.keys().cloned());
        names
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.is_plain_member(name) || self.is_variable_slot(name)
    }

    /// Whether `name` is a member the type or an ancestor defines itself.
    pub fn is_plain_member(&self, name: &str) -> bool {
        self.members.contains(name) || self.inherited.contains(name)
    }

    /// Whether `name` is only known as a variable slot, bound here or on an
    /// ancestor.
    pub fn is_variable_slot(&self, name: &str) -> bool {
        !self.is_plain_member(name)
            && (self.index.contains_key(name) || self.inherited_slots.contains(name))
    }

    /// Bind `field` under `name`, replacing the field of an existing slot.
    pub fn bind(&mut self, name: &str, field: Box<dyn Field>) -> SlotId {
        if let Some(&id) = self.index.get(name) {
            self.slots[id.0].field = field;
            return id;
        }
        let id = SlotId(self.slots.len());
        self.slots.push(Slot {
            name: name.to_string(),
            field,
        });
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn slot_id(&self, name: &str) -> Option<SlotId> {
        self.index.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&dyn Field> {
        self.slot_id(name).map(|id| self.slots[id.0].field.as_ref())
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot names in binding order.
    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.name.as_str())
    }

    /// Value stored on `instance` for the slot `name`.
    pub fn get<'a>(&self, instance: &'a Instance, name: &str) -> Option<&'a Value> {
        self.slot_id(name).and_then(|id| instance.value(id))
    }

    /// Validate `value` through the slot's field and store it on `instance`.
    pub fn set(&self, instance: &mut Instance, name: &str, value: Value) -> Result<(), SlotError> {
        let id = self.slot_id(name).ok_or_else(|| SlotError::UnknownSlot {
            type_name: self.name.clone(),
            name: name.to_string(),
        })?;
        self.set_slot(instance, id, value)?;
        Ok(())
    }

    pub(crate) fn set_slot(
        &self,
        instance: &mut Instance,
        id: SlotId,
        value: Value,
    ) -> Result<(), FieldError> {
        let stored = self.slots[id.0].field.validate(value)?;
        instance.store(id, stored);
        Ok(())
    }

    /// `(name, value)` for every slot in binding order; unset slots yield `None`.
    pub fn entries<'a>(
        &'a self,
        instance: &'a Instance,
    ) -> impl Iterator<Item = (&'a str, Option<&'a Value>)> + 'a {
        self.slots
            .iter()
            .enumerate()
            .map(move |(i, slot)| (slot.name.as_str(), instance.value(SlotId(i))))
    }
}

/// Value storage of one instance of a definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instance {
    definition: String,
    values: Vec<Option<Value>>,
}

impl Instance {
    pub fn new(definition: impl Into<String>) -> Self {
        Self {
            definition: definition.into(),
            values: Vec::new(),
        }
    }

    /// Name of the definition this is an instance of.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn value(&self, id: SlotId) -> Option<&Value> {
        self.values.get(id.0).and_then(Option::as_ref)
    }

    /// Number of slots holding a value.
    pub fn set_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub(super) fn store(&mut self, id: SlotId, value: Value) {
        if self.values.len() <= id.0 {
            self.values.resize(id.0 + 1, None);
        }
        self.values[id.0] = Some(value);
    }
}
