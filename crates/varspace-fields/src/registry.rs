//! Field kind registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::FieldError;
use crate::field::{AnyFieldFactory, FieldFactory};
use crate::typed::TypedFieldFactory;

/// Maps field kind names to their factories.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    factories: BTreeMap<String, Arc<dyn FieldFactory>>,
}

impl FieldRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `any` and `typed` kinds.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AnyFieldFactory));
        registry.register(Arc::new(TypedFieldFactory));
        registry
    }

    /// Register a factory under its own kind name, replacing any previous one.
    pub fn register(&mut self, factory: Arc<dyn FieldFactory>) {
        self.factories.insert(factory.kind().to_string(), factory);
    }

    pub fn resolve(&self, kind: &str) -> Result<Arc<dyn FieldFactory>, FieldError> {
        self.factories
            .get(kind)
            .cloned()
            .ok_or_else(|| FieldError::UnknownKind(kind.to_string()))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::FieldArgs;
    use crate::field::Field;
    use serde_json::{json, Value};

    #[derive(Debug)]
    struct UpperField;

    impl Field for UpperField {
        fn kind(&self) -> &str {
            "upper"
        }

        fn validate(&self, value: Value) -> Result<Value, FieldError> {
            match value {
                Value::String(s) => Ok(Value::String(s.to_uppercase())),
                other => Err(FieldError::TypeMismatch {
                    expected: "str".to_string(),
                    found: other.to_string(),
                }),
            }
        }
    }

    #[derive(Debug)]
    struct UpperFactory;

    impl FieldFactory for UpperFactory {
        fn kind(&self) -> &str {
            "upper"
        }

        fn build(&self, _args: &FieldArgs) -> Result<Box<dyn Field>, FieldError> {
            Ok(Box::new(UpperField))
        }
    }

    #[test]
    fn test_builtins() {
        let registry = FieldRegistry::with_builtins();
        assert_eq!(registry.kinds(), vec!["any", "typed"]);
        assert!(registry.resolve("typed").is_ok());
    }

    #[test]
    fn test_unknown_kind() {
        let registry = FieldRegistry::new();
        let err = registry.resolve("typed").unwrap_err();
        assert_eq!(err, FieldError::UnknownKind("typed".to_string()));
    }

    #[test]
    fn test_custom_factory() {
        let mut registry = FieldRegistry::with_builtins();
        registry.register(Arc::new(UpperFactory));
        assert!(registry.contains("upper"));

        let field = registry
            .resolve("upper")
            .unwrap()
            .build(&FieldArgs::new())
            .unwrap();
        assert_eq!(field.validate(json!("abc")).unwrap(), json!("ABC"));
    }
}
