//! Materialisation of a composed space onto a target type and instance.

use log::debug;

use super::layout::{Instance, TypeLayout};
use super::space::VarSpace;
use crate::error::VarSpaceError;

impl VarSpace {
    /// Bind one slot per variable on `layout` and store defaults on `instance`.
    ///
    /// Slots are bound in declaration order. Binding a name that already has
    /// a slot replaces its field with one built from this space's
    /// declaration. Every field is built and every defined default validated
    /// before anything is bound, so on error (`InvalidFieldType`,
    /// `InvalidDefaultValue`) the layout, the instance and the injected names
    /// are left as they were. On success every bound name is recorded as
    /// injected. The variables themselves are not modified.
    pub fn inject(
        &mut self,
        instance: &mut Instance,
        layout: &mut TypeLayout,
    ) -> Result<(), VarSpaceError> {
        let definition = instance.definition().to_string();

        let mut staged = Vec::with_capacity(self.vars.len());
        for (name, var) in &self.vars {
            let field = var
                .build_field()
                .map_err(|source| VarSpaceError::InvalidFieldType {
                    name: name.clone(),
                    definition: definition.clone(),
                    source,
                })?;

            let value = match var.default_value() {
                Some(value) => Some(field.validate(value.clone()).map_err(|source| {
                    VarSpaceError::InvalidDefaultValue {
                        name: name.clone(),
                        definition: definition.clone(),
                        source,
                    }
                })?),
                None => None,
            };
            staged.push((name, field, value));
        }

        for (name, field, value) in staged {
            let id = layout.bind(name, field);
            if let Some(value) = value {
                instance.store(id, value);
            }
            if !self.injected.contains(name) {
                self.injected.insert(name.clone());
            }
        }

        debug!(
            "injected {} variable(s) into '{}' ({} with defaults)",
            self.vars.len(),
            layout.name(),
            instance.set_count()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::LocalVarSpace;
    use serde_json::json;
    use varspace_fields::{FieldArgs, FieldRegistry};

    fn compose(local: LocalVarSpace) -> VarSpace {
        VarSpace::compose([], &local, &FieldRegistry::with_builtins(), "T").unwrap()
    }

    #[test]
    fn test_inject_binds_and_sets_defaults() {
        let mut space = compose(
            LocalVarSpace::new()
                .declare_with_value("retries", "typed", FieldArgs::positional(["int"]), 3)
                .declare("timeout", "typed", FieldArgs::positional(["int"])),
        );
        let mut layout = TypeLayout::new("T");
        let mut inst = Instance::new("T");
        space.inject(&mut inst, &mut layout).unwrap();

        assert_eq!(layout.slot_names().collect::<Vec<_>>(), vec!["retries", "timeout"]);
        assert_eq!(layout.get(&inst, "retries"), Some(&json!(3)));
        assert_eq!(layout.get(&inst, "timeout"), None);
        assert!(space.is_injected("retries"));
        assert!(space.is_injected("timeout"));
    }

    #[test]
    fn test_injected_slots_validate_later_writes() {
        let mut space = compose(LocalVarSpace::new().declare(
            "name",
            "typed",
            FieldArgs::positional(["str"]),
        ));
        let mut layout = TypeLayout::new("T");
        let mut inst = Instance::new("T");
        space.inject(&mut inst, &mut layout).unwrap();

        assert!(layout.set(&mut inst, "name", json!("ok")).is_ok());
        assert!(layout.set(&mut inst, "name", json!(1)).is_err());
    }

    #[test]
    fn test_invalid_default_value() {
        let mut space = compose(LocalVarSpace::new().declare_with_value(
            "retries",
            "typed",
            FieldArgs::positional(["int"]),
            "three",
        ));
        let mut layout = TypeLayout::new("T");
        let mut inst = Instance::new("T");
        let err = space.inject(&mut inst, &mut layout).unwrap_err();
        assert_eq!(err.code(), "INVALID_DEFAULT_VALUE");
        assert_eq!(err.variable(), Some("retries"));
    }

    #[test]
    fn test_failed_injection_leaves_no_trace() {
        let mut space = compose(
            LocalVarSpace::new()
                .declare_with_value("a", "typed", FieldArgs::positional(["int"]), 1)
                .declare_with_value("b", "typed", FieldArgs::positional(["int"]), "bad"),
        );
        let mut layout = TypeLayout::new("T");
        let mut inst = Instance::new("T");

        let err = space.inject(&mut inst, &mut layout).unwrap_err();
        assert_eq!(err.variable(), Some("b"));
        assert_eq!(layout.slot_count(), 0);
        assert_eq!(inst.set_count(), 0);
        assert!(space.injected().is_empty());
    }

    #[test]
    fn test_second_injection_passes_sanity() {
        let mut space = compose(LocalVarSpace::new().declare_with_value(
            "z",
            "typed",
            FieldArgs::positional(["int"]),
            1,
        ));
        let mut layout = TypeLayout::new("T");
        space.sanity(&layout, "T", None).unwrap();

        let mut first = Instance::new("T");
        space.inject(&mut first, &mut layout).unwrap();
        assert!(layout.has_member("z"));
        space.sanity(&layout, "T", None).unwrap();

        let mut second = Instance::new("T");
        space.inject(&mut second, &mut layout).unwrap();
        assert_eq!(layout.slot_count(), 1);
        assert_eq!(layout.get(&second, "z"), Some(&json!(1)));
    }

    #[test]
    fn test_inject_does_not_touch_variables() {
        let mut space = compose(LocalVarSpace::new().declare_with_value(
            "z",
            "typed",
            FieldArgs::positional(["int"]),
            1,
        ));
        let before = space.snapshot();
        let mut layout = TypeLayout::new("T");
        space.inject(&mut Instance::new("T"), &mut layout).unwrap();
        assert_eq!(space.snapshot(), before);
    }
}
