//! Definition file tests
//!
//! Loads the TOML definitions under tests/data and drives the `varspace`
//! binary against them.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use varspace::config::{load_file, load_paths};
use varspace::{ConfigError, DefinitionRegistry};

fn data_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

/// Run the binary with an empty config home so user settings never leak in.
fn varspace(args: &[&str]) -> (i32, String) {
    let home = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_varspace"))
        .args(args)
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run varspace");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
    )
}

#[test]
fn test_hierarchy_file_registers() {
    let loaded = load_file(&data_path("hierarchy.toml"), "typed").unwrap();
    assert_eq!(loaded.sources.len(), 1);
    assert_eq!(loaded.names().collect::<Vec<_>>(), ["Base", "Mid", "Leaf"]);

    let mut registry = DefinitionRegistry::new();
    loaded.register_all(&mut registry).unwrap();

    let leaf = registry.var_space("Leaf").unwrap();
    assert!(!leaf.get("timeout").unwrap().is_defined());
    assert_eq!(leaf.get("retries").unwrap().default_value(), Some(&json!(3)));
}

#[test]
fn test_directory_load_is_stable() {
    let first = load_paths(&[data_path("")], "typed").unwrap();
    let second = load_paths(&[data_path("")], "typed").unwrap();
    assert_eq!(first.sources, second.sources);
    assert!(first.sources[0].path.ends_with("clash.toml"));
    assert!(first.sources[1].path.ends_with("hierarchy.toml"));
}

#[test]
fn test_clash_file_is_rejected() {
    let loaded = load_file(&data_path("clash.toml"), "typed").unwrap();
    let mut registry = DefinitionRegistry::new();
    match loaded.register_all(&mut registry).unwrap_err() {
        ConfigError::Registration(err) => {
            assert_eq!(err.code(), "NAME_CLASH");
            assert_eq!(err.variable(), Some("name"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_cli_check() {
    let hierarchy = data_path("hierarchy.toml");
    let (code, stdout) = varspace(&["check", hierarchy.to_str().unwrap()]);
    assert_eq!(code, 0);
    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["ok"], json!(true));
    assert_eq!(report["definitions"], json!(["Base", "Mid", "Leaf"]));
}

#[test]
fn test_cli_check_reports_rejection() {
    let clash = data_path("clash.toml");
    let (code, stdout) = varspace(&["check", clash.to_str().unwrap()]);
    assert_eq!(code, 1);
    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["code"], json!("NAME_CLASH"));
}

#[test]
fn test_cli_compose_single_definition() {
    let hierarchy = data_path("hierarchy.toml");
    let (code, stdout) = varspace(&[
        "compose",
        hierarchy.to_str().unwrap(),
        "--definition",
        "Mid",
    ]);
    assert_eq!(code, 0);
    let summary: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["definitions"][0]["name"], json!("Mid"));
    assert_eq!(
        summary["definitions"][0]["variables"]["timeout"]["value"],
        json!(20)
    );
    assert_eq!(summary["definitions"][0]["digest"].as_str().map(str::len), Some(64));
}

#[test]
fn test_cli_instantiate_human() {
    let hierarchy = data_path("hierarchy.toml");
    let (code, stdout) = varspace(&[
        "instantiate",
        hierarchy.to_str().unwrap(),
        "--definition",
        "Leaf",
        "--human",
    ]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "Leaf\n  timeout unset\n  retries = 3\n");
}

#[test]
fn test_cli_missing_file() {
    let (code, _) = varspace(&["check", "/nonexistent/defs.toml"]);
    assert_eq!(code, 2);
}
