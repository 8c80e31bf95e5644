//! Definition files.
//!
//! A definition file is a TOML document holding an array of `[[definition]]`
//! tables:
//!
//! ```toml
//! [[definition]]
//! name = "Base"
//! members = ["run"]
//!
//! [[definition.declare]]
//! name = "timeout"
//! args = ["int"]
//! value = 10
//!
//! [[definition]]
//! name = "Leaf"
//! parents = ["Base"]
//! undefine = ["timeout"]
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use varspace_fields::FieldArgs;
use walkdir::WalkDir;

use super::error::ConfigError;
use crate::registry::{Definition, DefinitionRegistry};
use crate::variables::LocalVarSpace;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionFile {
    #[serde(default)]
    definition: Vec<DefinitionTable>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionTable {
    name: String,
    #[serde(default)]
    parents: Vec<String>,
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    declare: Vec<DeclareTable>,
    #[serde(default)]
    define: IndexMap<String, toml::Value>,
    #[serde(default)]
    undefine: Vec<String>,
    #[serde(default)]
    assign: IndexMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeclareTable {
    name: String,
    field: Option<String>,
    #[serde(default)]
    args: Vec<toml::Value>,
    #[serde(default)]
    kwargs: toml::Table,
    value: Option<toml::Value>,
}

impl DefinitionTable {
    fn into_definition(self, default_field: &str) -> Result<Definition, ConfigError> {
        let mut local = LocalVarSpace::new();
        for decl in self.declare {
            let field = decl.field.unwrap_or_else(|| default_field.to_string());
            let mut args = FieldArgs::new();
            for arg in decl.args {
                args.args.push(toml_to_json(arg)?);
            }
            for (key, value) in decl.kwargs {
                args.kwargs.insert(key, toml_to_json(value)?);
            }
            local = match decl.value {
                Some(value) => {
                    local.declare_with_value(decl.name, field, args, toml_to_json(value)?)
                }
                None => local.declare(decl.name, field, args),
            };
        }
        for (name, value) in self.define {
            local = local.define(name, toml_to_json(value)?);
        }
        for name in self.undefine {
            local = local.undefine(name);
        }
        for (name, value) in self.assign {
            local = local.assign(name, toml_to_json(value)?);
        }

        let definition = self
            .parents
            .into_iter()
            .fold(Definition::new(self.name), |def, parent| def.extends(parent));
        Ok(self
            .members
            .into_iter()
            .fold(definition, |def, member| def.member(member))
            .with_local(local))
    }
}

/// A definition file that contributed to a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionSource {
    pub path: String,

    /// SHA-256 of the raw file bytes
    pub digest: String,
}

/// Definitions read from one or more files, in file order.
#[derive(Debug, Clone, Default)]
pub struct LoadedDefinitions {
    pub sources: Vec<DefinitionSource>,
    pub definitions: Vec<Definition>,
}

impl LoadedDefinitions {
    /// Register every loaded definition, stopping at the first rejection.
    pub fn register_all(&self, registry: &mut DefinitionRegistry) -> Result<(), ConfigError> {
        for definition in &self.definitions {
            registry.register(definition.clone())?;
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(Definition::name)
    }
}

/// Parse definitions from TOML text.
///
/// Declarations without a `field` key use `default_field`.
pub fn parse_str(contents: &str, default_field: &str) -> Result<Vec<Definition>, ConfigError> {
    let file: DefinitionFile = toml::from_str(contents)
        .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;
    file.into_definitions(default_field)
}

impl DefinitionFile {
    fn into_definitions(self, default_field: &str) -> Result<Vec<Definition>, ConfigError> {
        self.definition
            .into_iter()
            .map(|table| table.into_definition(default_field))
            .collect()
    }
}

/// Load definitions from a single file.
pub fn load_file(path: &Path, default_field: &str) -> Result<LoadedDefinitions, ConfigError> {
    let bytes = fs::read(path)
        .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
    let digest = sha256_hex(&bytes);

    let contents = String::from_utf8(bytes)
        .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;
    let file: DefinitionFile = toml::from_str(&contents)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
    let definitions = file.into_definitions(default_field).map_err(|e| match e {
        ConfigError::ParseError(msg) => {
            ConfigError::ParseError(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })?;

    Ok(LoadedDefinitions {
        sources: vec![DefinitionSource {
            path: path.to_string_lossy().to_string(),
            digest,
        }],
        definitions,
    })
}

/// Load definitions from files and directories.
///
/// Directories are searched recursively for `*.toml` files, visited in
/// sorted path order. Explicit files are loaded whatever their extension.
pub fn load_paths<P: AsRef<Path>>(
    paths: &[P],
    default_field: &str,
) -> Result<LoadedDefinitions, ConfigError> {
    let mut loaded = LoadedDefinitions::default();

    for path in paths {
        for file in expand(path.as_ref())? {
            let next = load_file(&file, default_field)?;
            loaded.sources.extend(next.sources);
            loaded.definitions.extend(next.definitions);
        }
    }

    Ok(loaded)
}

fn expand(path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| ConfigError::IoError(e.to_string()))?;
        let is_toml = entry.path().extension().is_some_and(|ext| ext == "toml");
        if entry.file_type().is_file() && is_toml {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Convert a TOML value to JSON.
///
/// JSON has no `nan` or `inf`; such floats are rejected.
pub(crate) fn toml_to_json(toml: toml::Value) -> Result<Value, ConfigError> {
    Ok(match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| {
                ConfigError::ParseError(format!("non-finite float {} is not supported", f))
            })?,
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(
            arr.into_iter()
                .map(toml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| Ok((k, toml_to_json(v)?)))
                .collect::<Result<_, ConfigError>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::Action;
    use serde_json::json;
    use tempfile::TempDir;

    const HIERARCHY: &str = r#"
[[definition]]
name = "Base"
members = ["run"]

[[definition.declare]]
name = "timeout"
args = ["int"]
value = 10

[[definition.declare]]
name = "tags"
field = "typed"
args = ["list[str]"]
kwargs = { allow_none = true }

[[definition]]
name = "Leaf"
parents = ["Base"]
undefine = ["timeout"]

[definition.define]
tags = ["slow"]
"#;

    #[test]
    fn test_parse_hierarchy() {
        let defs = parse_str(HIERARCHY, "typed").unwrap();
        assert_eq!(defs.len(), 2);

        let base = &defs[0];
        assert_eq!(base.name(), "Base");
        assert!(base.members().contains("run"));
        let actions = base.local().actions();
        assert_eq!(actions.len(), 2);
        match &actions[1] {
            Action::Declare(decl) => {
                assert_eq!(decl.field_kind, "typed");
                assert_eq!(decl.args.kwargs.get("allow_none"), Some(&json!(true)));
                assert!(!decl.default.is_defined());
            }
            other => panic!("unexpected action {:?}", other),
        }

        let leaf = &defs[1];
        assert_eq!(leaf.parents(), ["Base".to_string()]);
        assert_eq!(leaf.local().actions().len(), 2);
    }

    #[test]
    fn test_default_field_applies() {
        let defs = parse_str(HIERARCHY, "any").unwrap();
        match &defs[0].local().actions()[0] {
            Action::Declare(decl) => assert_eq!(decl.field_kind, "any"),
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_assign_section() {
        let defs = parse_str(
            r#"
[[definition]]
name = "A"

[[definition.declare]]
name = "retries"
args = ["int"]

[definition.assign]
retries = 3
"#,
            "typed",
        )
        .unwrap();
        assert_eq!(
            defs[0].local().assignments(),
            [("retries".to_string(), json!(3))]
        );
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = parse_str("[[definition]]\nname = \"A\"\nextra = 1\n", "typed").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_register_all() {
        let loaded = LoadedDefinitions {
            sources: Vec::new(),
            definitions: parse_str(HIERARCHY, "typed").unwrap(),
        };
        let mut registry = DefinitionRegistry::new();
        loaded.register_all(&mut registry).unwrap();
        assert_eq!(registry.len(), 2);
        let leaf = registry.var_space("Leaf").unwrap();
        assert!(!leaf.get("timeout").unwrap().is_defined());
        assert_eq!(leaf.get("tags").unwrap().default_value(), Some(&json!(["slow"])));
    }

    #[test]
    fn test_register_all_surfaces_rejection() {
        let loaded = LoadedDefinitions {
            sources: Vec::new(),
            definitions: parse_str(
                "[[definition]]\nname = \"A\"\nundefine = [\"ghost\"]\n",
                "typed",
            )
            .unwrap(),
        };
        let mut registry = DefinitionRegistry::new();
        let err = loaded.register_all(&mut registry).unwrap_err();
        match err {
            ConfigError::Registration(inner) => assert_eq!(inner.code(), "UNDECLARED_VARIABLE"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_load_paths_walks_directories_in_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("b.toml"),
            "[[definition]]\nname = \"Child\"\nparents = [\"Root\"]\n",
        )
        .unwrap();
        fs::write(dir.path().join("a.toml"), "[[definition]]\nname = \"Root\"\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loaded = load_paths(&[dir.path()], "typed").unwrap();
        assert_eq!(loaded.sources.len(), 2);
        assert!(loaded.sources[0].path.ends_with("a.toml"));
        assert_eq!(loaded.sources[0].digest.len(), 64);
        assert_eq!(loaded.names().collect::<Vec<_>>(), ["Root", "Child"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_file(Path::new("/nonexistent/defs.toml"), "typed").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn test_toml_to_json_nested() {
        let value: toml::Value = toml::from_str("a = { b = [1, 2.5, true] }").unwrap();
        assert_eq!(toml_to_json(value).unwrap(), json!({"a": {"b": [1, 2.5, true]}}));
    }

    #[test]
    fn test_non_finite_default_rejected() {
        let contents = r#"
[[definition]]
name = "A"

[[definition.declare]]
name = "x"
args = ["float"]
value = nan
"#;
        let err = parse_str(contents, "typed").unwrap_err();
        match err {
            ConfigError::ParseError(msg) => assert!(msg.contains("non-finite")),
            other => panic!("unexpected error {:?}", other),
        }

        let err = parse_str(
            "[[definition]]\nname = \"A\"\n\n[definition.assign]\nx = [1.0, inf]\n",
            "typed",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
