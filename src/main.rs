//! varspace CLI
//!
//! Entry point for the `varspace` command-line tool.

use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::process;
use varspace::config::{self, default_settings_path, OutputFormat};
use varspace::{
    ComposeSummary, ConfigError, DefinitionRegistry, EffectiveSettings, InstanceSummary,
    LoadedDefinitions, Settings,
};

/// Exit code for a rejected definition
const EXIT_REGISTRATION: i32 = 1;

/// Exit code for configuration and IO problems
const EXIT_CONFIG: i32 = 2;

#[derive(Parser)]
#[command(name = "varspace")]
#[command(about = "Compose and check variable namespaces", version)]
struct Cli {
    /// Path to settings file (default: $XDG_CONFIG_HOME/varspace/settings.toml)
    #[arg(long, short = 's', global = true)]
    settings: Option<PathBuf>,

    /// Output in human-readable format instead of JSON
    #[arg(long, global = true)]
    human: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register every definition and report the first rejection
    Check {
        /// Definition files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print composed namespaces
    Compose {
        /// Definition files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Only print this definition
        #[arg(long, short = 'd')]
        definition: Option<String>,
    },

    /// Create an instance and print its values
    Instantiate {
        /// Definition files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Definition to instantiate
        #[arg(long, short = 'd')]
        definition: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Settings error: {}", e);
            process::exit(EXIT_CONFIG);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log_level.as_str()),
    )
    .init();

    match cli.command {
        Commands::Check { paths } => run_check(&settings, &paths),
        Commands::Compose { paths, definition } => {
            run_compose(&settings, &paths, definition.as_deref())
        }
        Commands::Instantiate { paths, definition } => {
            run_instantiate(&settings, &paths, &definition)
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let user_path = cli.settings.clone().or_else(default_settings_path);
    if let Some(path) = &cli.settings {
        if !path.exists() {
            return Err(ConfigError::IoError(format!(
                "settings file not found: {}",
                path.display()
            )));
        }
    }

    let mut overrides = Map::new();
    if cli.human {
        overrides.insert("output".to_string(), json!("human"));
    }
    let cli_layer = (!overrides.is_empty()).then_some(Value::Object(overrides));

    EffectiveSettings::build(user_path.as_deref(), cli_layer).map(|e| e.settings)
}

/// Load and register definitions, exiting on failure.
fn load_registry(settings: &Settings, paths: &[PathBuf]) -> (DefinitionRegistry, LoadedDefinitions) {
    let loaded = match config::load_paths(paths, &settings.default_field) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error loading definitions: {}", e);
            process::exit(EXIT_CONFIG);
        }
    };

    let mut registry = DefinitionRegistry::new();
    if let Err(e) = loaded.register_all(&mut registry) {
        report_failure(settings, &e);
    }
    (registry, loaded)
}

fn report_failure(settings: &Settings, err: &ConfigError) -> ! {
    let ConfigError::Registration(inner) = err else {
        eprintln!("Error: {}", err);
        process::exit(EXIT_CONFIG);
    };

    match settings.output {
        OutputFormat::Human => eprintln!("Rejected: {} [{}]", inner, inner.code()),
        OutputFormat::Json => {
            let report = json!({
                "ok": false,
                "code": inner.code(),
                "variable": inner.variable(),
                "message": inner.to_string(),
            });
            println!("{}", report);
        }
    }
    process::exit(EXIT_REGISTRATION);
}

fn run_check(settings: &Settings, paths: &[PathBuf]) {
    let (registry, loaded) = load_registry(settings, paths);

    match settings.output {
        OutputFormat::Human => {
            println!(
                "OK: {} definition(s) from {} file(s)",
                registry.len(),
                loaded.sources.len()
            );
        }
        OutputFormat::Json => {
            let report = json!({
                "ok": true,
                "definitions": registry.definitions().collect::<Vec<_>>(),
                "sources": loaded.sources,
            });
            println!("{}", report);
        }
    }
}

fn run_compose(settings: &Settings, paths: &[PathBuf], only: Option<&str>) {
    let (registry, loaded) = load_registry(settings, paths);

    let summary = match ComposeSummary::from_registry(&registry, loaded.sources, only) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_REGISTRATION);
        }
    };

    match settings.output {
        OutputFormat::Human => print!("{}", summary.to_human()),
        OutputFormat::Json => match summary.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(EXIT_CONFIG);
            }
        },
    }
}

fn run_instantiate(settings: &Settings, paths: &[PathBuf], name: &str) {
    let (mut registry, _) = load_registry(settings, paths);

    let instance = match registry.instantiate(name) {
        Ok(i) => i,
        Err(e) => report_failure(settings, &ConfigError::Registration(e)),
    };
    let Some(layout) = registry.layout(name) else {
        eprintln!("Error: unknown definition '{}'", name);
        process::exit(EXIT_REGISTRATION);
    };

    let summary = InstanceSummary::new(layout, &instance);
    match settings.output {
        OutputFormat::Human => print!("{}", summary.to_human()),
        OutputFormat::Json => match summary.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(EXIT_CONFIG);
            }
        },
    }
}
