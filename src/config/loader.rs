//! Directory loading and the validated config accessor.
//!
//! Every `*.yaml`/`*.yml` file in the config directory is read in file-name
//! order and merged over the defaults tree, then validated and stripped.

use super::merge::merge_layers;
use super::schema::SchemaNode;
use super::validate::validate;
use crate::error::{ConfigError, ConfigResult, ValidationIssue};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming the config directory.
pub const CONFIG_DIR_ENV: &str = "BRIDGE_CONFIG_DIR";

/// Directory name searched in the working directory and under the platform config dir.
const DEFAULT_CONFIG_DIR: &str = "config";

/// Application directory name under the platform config dir.
const APP_DIR: &str = "bridge-config";

/// Key used for the root of the tree in validation reports.
const ROOT_KEY: &str = "Base";

/// Location of the config directory.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover the config directory from the environment and defaults.
    pub fn discover() -> Self {
        // Explicit override: BRIDGE_CONFIG_DIR
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Self::with_dir(dir);
        }

        // Local ./config next to the process
        let local = PathBuf::from(DEFAULT_CONFIG_DIR);
        if local.is_dir() {
            return Self::with_dir(local);
        }

        let config_dir = dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or(local);
        Self { config_dir }
    }

    /// Use an explicit config directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: dir.into(),
        }
    }
}

/// Read one YAML file into a tree. Blank and comment-only files read as null.
pub(crate) fn read_yaml_file(path: &Path) -> ConfigResult<Value> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_yaml(path, &contents)
}

pub(crate) fn parse_yaml(path: &Path, contents: &str) -> ConfigResult<Value> {
    let blank = contents
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'));
    if blank {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and merge every YAML file in `directory` over `defaults`.
///
/// Any malformed file fails the whole load rather than yielding a partial tree.
pub fn load_directory(directory: &Path, defaults: Value) -> ConfigResult<Value> {
    if !directory.is_dir() {
        return Err(ConfigError::DirectoryNotFound {
            path: directory.to_path_buf(),
        });
    }

    let read_err = |source| ConfigError::Read {
        path: directory.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(directory).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if is_yaml && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut layers = Vec::with_capacity(files.len());
    for path in &files {
        let value = read_yaml_file(path)?;
        match value {
            Value::Null => debug!(path = %path.display(), "Skipping empty config file"),
            Value::Object(_) => {
                debug!(path = %path.display(), "Loaded config file");
                layers.push(value);
            }
            _ => {
                return Err(ConfigError::InvalidDocument {
                    path: path.clone(),
                    reason: "top level must be a mapping".to_string(),
                });
            }
        }
    }

    if files.is_empty() {
        warn!(dir = %directory.display(), "No YAML files in config directory");
    }

    let merged = match merge_layers(defaults, layers) {
        Value::Null => Value::Object(Map::new()),
        merged => merged,
    };
    info!(dir = %directory.display(), files = files.len(), "Config directory loaded");
    Ok(merged)
}

/// Validated, stripped configuration.
///
/// The verdict is computed once at construction; nothing is mutable afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    tree: Value,
    requirements: SchemaNode,
    valid: bool,
    issues: Vec<ValidationIssue>,
}

impl Config {
    /// Load `path` over `defaults` and validate it against `requirements`.
    pub fn load(
        path: impl AsRef<Path>,
        requirements: SchemaNode,
        defaults: Value,
    ) -> ConfigResult<Self> {
        let path = path.as_ref();
        info!(dir = %path.display(), "Loading config");
        let tree = load_directory(path, defaults)?;
        Ok(Self::from_tree(tree, requirements))
    }

    /// Validate an already-loaded tree.
    pub fn from_tree(mut tree: Value, requirements: SchemaNode) -> Self {
        let report = validate(ROOT_KEY, &mut tree, &requirements);
        let valid = report.is_valid();
        if valid {
            info!("Config is valid");
        } else {
            warn!(issues = report.issues().len(), "Config is invalid");
        }
        Self {
            tree,
            requirements,
            valid,
            issues: report.into_issues(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Every failed check, in the order they were found.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Schema this config was validated against.
    pub fn requirements(&self) -> &SchemaNode {
        &self.requirements
    }

    /// The whole stripped tree for `None`, or one top-level entry.
    pub fn get(&self, key: Option<&str>) -> ConfigResult<&Value> {
        match key {
            None => Ok(&self.tree),
            Some(key) => self
                .tree
                .get(key)
                .ok_or_else(|| ConfigError::KeyNotFound(key.to_string())),
        }
    }
}
