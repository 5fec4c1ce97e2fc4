//! CLI command definitions for bridge-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod check;
pub mod show;
pub mod sync;

use crate::config::{ConfigPaths, SchemaNode};
use anyhow::{Context as _, Result};
use check::CheckArgs;
use clap::{Parser, Subcommand};
use serde_json::Value;
use show::ShowArgs;
use std::path::{Path, PathBuf};
use sync::SyncArgs;

/// Validate and maintain the YAML configuration of a sensor bridge
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config directory (default: $BRIDGE_CONFIG_DIR or ./config)
    #[arg(short, long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// YAML schema file (default: built-in bridge schema)
    #[arg(short, long, global = true)]
    pub schema: Option<PathBuf>,

    /// YAML file with default values merged under the config files
    #[arg(short, long, global = true)]
    pub defaults: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the config directory (default if no subcommand given)
    Check(CheckArgs),

    /// Print the validated, stripped config
    Show(ShowArgs),

    /// Write recognized environment variables into the config files
    Sync(SyncArgs),
}

/// Inputs shared by every subcommand, resolved from the global options.
#[derive(Debug, Clone)]
pub struct Context {
    pub config_dir: PathBuf,
    pub schema: SchemaNode,
    pub defaults: Value,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config_dir = match &cli.config_dir {
            Some(dir) => dir.clone(),
            None => ConfigPaths::discover().config_dir,
        };
        let schema = match &cli.schema {
            Some(path) => load_schema(path)?,
            None => SchemaNode::bridge(),
        };
        let defaults = match &cli.defaults {
            Some(path) => load_defaults(path)?,
            None => Value::Null,
        };
        Ok(Self {
            config_dir,
            schema,
            defaults,
        })
    }
}

fn load_schema(path: &Path) -> Result<SchemaNode> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema {}", path.display()))?;
    SchemaNode::from_yaml_str(&contents)
        .with_context(|| format!("Invalid schema {}", path.display()))
}

fn load_defaults(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read defaults {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Invalid defaults {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapEnv;
    use crate::error::ConfigError;
    use crate::format::OutputFormat;
    use check::run_check;
    use show::run_show;
    use sync::run_sync_with;
    use tempfile::TempDir;

    fn bridge_context(dir: &Path) -> Context {
        Context {
            config_dir: dir.to_path_buf(),
            schema: SchemaNode::bridge(),
            defaults: Value::Null,
        }
    }

    #[test]
    fn test_parse_sync_with_globals() {
        let cli = Cli::parse_from([
            "bridge-config",
            "--config-dir",
            "/etc/bridge",
            "sync",
            "--no-check",
        ]);
        assert_eq!(cli.config_dir, Some(PathBuf::from("/etc/bridge")));
        assert!(matches!(cli.command, Some(Command::Sync(ref args)) if args.no_check));
    }

    #[test]
    fn test_context_loads_schema_and_defaults() {
        let temp = TempDir::new().unwrap();
        let schema = temp.path().join("schema.yaml");
        std::fs::write(&schema, "required_entries: { name: string }\n").unwrap();
        let defaults = temp.path().join("defaults.yaml");
        std::fs::write(&defaults, "name: bridge\n").unwrap();

        let args: Vec<std::ffi::OsString> = vec![
            "bridge-config".into(),
            "-c".into(),
            temp.path().into(),
            "--schema".into(),
            schema.clone().into(),
            "--defaults".into(),
            defaults.clone().into(),
        ];
        let cli = Cli::parse_from(args);
        let ctx = Context::from_cli(&cli).unwrap();
        assert_eq!(ctx.config_dir, temp.path());
        assert!(ctx.schema.allows("name"));
        assert_eq!(ctx.defaults, serde_json::json!({"name": "bridge"}));
    }

    #[test]
    fn test_bad_schema_file_errors() {
        let temp = TempDir::new().unwrap();
        let schema = temp.path().join("schema.yaml");
        std::fs::write(&schema, "required_entries: { name: text }\n").unwrap();
        assert!(load_schema(&schema).is_err());
    }

    #[test]
    fn test_check_reports_invalid_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("device.yaml"), "devices: []\n").unwrap();
        let ctx = bridge_context(temp.path());

        assert!(!run_check(&ctx, &CheckArgs::default()).unwrap());
    }

    #[test]
    fn test_check_fails_on_missing_directory() {
        let temp = TempDir::new().unwrap();
        let ctx = bridge_context(&temp.path().join("absent"));

        assert!(run_check(&ctx, &CheckArgs::default()).is_err());
    }

    #[test]
    fn test_sync_then_check_becomes_valid() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("mqtt.yaml"), "keepalive: 60\n").unwrap();
        let ctx = bridge_context(temp.path());
        assert!(!run_check(&ctx, &CheckArgs::default()).unwrap());

        let env = MapEnv::new()
            .with("device_name", "grill")
            .with("device_address", "70:91:8F:00:00:01")
            .with("device_type", "igrill_v2")
            .with("mqtt_host", "broker.local")
            .with("mqtt_port", "1883");
        assert!(run_sync_with(&ctx, &SyncArgs::default(), &env).unwrap());
        assert!(temp.path().join("device.yaml").exists());
    }

    #[test]
    fn test_sync_without_check_skips_validation() {
        let temp = TempDir::new().unwrap();
        let ctx = bridge_context(temp.path());
        let env = MapEnv::new().with("mqtt_host", "broker.local");

        let args = SyncArgs { no_check: true };
        assert!(run_sync_with(&ctx, &args, &env).unwrap());
        assert!(!run_sync_with(&ctx, &SyncArgs::default(), &env).unwrap());
    }

    #[test]
    fn test_sync_coercion_error_propagates() {
        let temp = TempDir::new().unwrap();
        let ctx = bridge_context(temp.path());
        let env = MapEnv::new().with("mqtt_port", "not-a-port");

        let err = run_sync_with(&ctx, &SyncArgs::default(), &env).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Coercion { .. })
        ));
    }

    #[test]
    fn test_show_missing_key_errors() {
        let temp = TempDir::new().unwrap();
        let ctx = bridge_context(temp.path());
        let args = ShowArgs {
            key: Some("nope".to_string()),
            format: OutputFormat::Json,
        };

        let err = run_show(&ctx, &args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::KeyNotFound(key)) if key == "nope"
        ));
    }

    #[test]
    fn test_show_whole_tree() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("mqtt.yaml"),
            "mqtt:\n  host: broker.local\n  port: 1883\n",
        )
        .unwrap();
        let ctx = bridge_context(temp.path());
        let args = ShowArgs {
            key: None,
            format: OutputFormat::Yaml,
        };

        assert!(run_show(&ctx, &args).is_ok());
    }
}
