//! Write environment-supplied values back into the config files.
//!
//! Each section with at least one variable set is rebuilt from the
//! environment alone and replaces the previous section wholesale; other
//! top-level keys in the file are kept in place. Both files are fully
//! prepared and staged as temp files before either is renamed into place, so
//! a bad value leaves every file untouched.
//!
//! Rewritten files are re-rendered from the parsed tree, so comments and
//! formatting are lost. YAML tags such as `secret: !vault abc` have no
//! representation in that tree: a target file containing one fails with
//! [`ConfigError::Parse`] and is left as it was.

use super::env::{EnvOverlayRecord, EnvSource, OverlayTarget, ProcessEnv, collect_overlay};
use super::loader::read_yaml_file;
use super::render::render_yaml;
use super::schema::{SchemaNode, ValueKind};
use crate::error::{ConfigError, ConfigResult};
use serde_json::{Map, Number, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// One file rewritten by the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayFile {
    pub path: PathBuf,
    pub target: OverlayTarget,
    /// Field keys written into the section, in variable order.
    pub keys: Vec<String>,
}

/// Summary of an overlay pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayOutcome {
    pub files: Vec<OverlayFile>,
}

impl OverlayOutcome {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Overlay the real process environment onto `config_dir`.
pub fn sync_from_process_env(
    config_dir: &Path,
    schema: &SchemaNode,
) -> ConfigResult<OverlayOutcome> {
    sync_env_overlay(config_dir, schema, &ProcessEnv)
}

/// Overlay variables from `env` onto the files in `config_dir`.
///
/// Values are coerced to the kind `schema` declares for the field in the
/// section's child schema. Sections with no variables set are not touched.
pub fn sync_env_overlay(
    config_dir: &Path,
    schema: &SchemaNode,
    env: &impl EnvSource,
) -> ConfigResult<OverlayOutcome> {
    if !config_dir.is_dir() {
        return Err(ConfigError::DirectoryNotFound {
            path: config_dir.to_path_buf(),
        });
    }

    let records = collect_overlay(env);
    debug!(count = records.len(), "Collected environment overlay");

    let mut staged = Vec::new();
    for target in OverlayTarget::ALL {
        let section: Vec<&EnvOverlayRecord> =
            records.iter().filter(|r| r.target == target).collect();
        if section.is_empty() {
            debug!(section = %target, "No environment values for section");
            continue;
        }

        let path = config_dir.join(target.file_name());
        let entries = build_section(&section, schema.children.get(target.section_key()))?;
        let mut document = read_document(&path)?;
        document.insert(target.section_key().to_string(), target.wrap(entries));

        let file = stage(&path, &render_yaml(&Value::Object(document)))?;
        let keys = section.iter().map(|r| r.key.clone()).collect();
        staged.push((file, OverlayFile { path, target, keys }));
    }

    let mut outcome = OverlayOutcome::default();
    for (file, written) in staged {
        file.persist(&written.path)
            .map_err(|err| ConfigError::Write {
                path: written.path.clone(),
                source: err.error,
            })?;
        info!(
            path = %written.path.display(),
            section = %written.target,
            keys = ?written.keys,
            "Applied environment overlay"
        );
        outcome.files.push(written);
    }
    Ok(outcome)
}

/// Convert a raw environment string to the declared kind.
///
/// Undeclared fields and string fields are kept verbatim.
pub fn coerce(record: &EnvOverlayRecord, kind: Option<ValueKind>) -> ConfigResult<Value> {
    let raw = record.raw.as_str();
    let fail = |expected| ConfigError::Coercion {
        variable: record.variable.to_string(),
        value: record.raw.clone(),
        expected,
    };

    match kind {
        None | Some(ValueKind::String) => Ok(Value::String(raw.to_string())),
        Some(ValueKind::Boolean) => {
            if raw.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(fail(ValueKind::Boolean))
            }
        }
        Some(ValueKind::Integer) => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| fail(ValueKind::Integer)),
        Some(ValueKind::Float) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| fail(ValueKind::Float)),
        Some(kind @ (ValueKind::Sequence | ValueKind::Mapping)) => Err(fail(kind)),
    }
}

fn build_section(
    records: &[&EnvOverlayRecord],
    schema: Option<&SchemaNode>,
) -> ConfigResult<Map<String, Value>> {
    let mut entries = Map::new();
    for record in records {
        let kind = schema.and_then(|s| s.entry_kind(&record.key));
        entries.insert(record.key.clone(), coerce(record, kind)?);
    }
    Ok(entries)
}

/// Current top-level mapping of a section file; missing or blank files are empty.
fn read_document(path: &Path) -> ConfigResult<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    match read_yaml_file(path)? {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::InvalidDocument {
            path: path.to_path_buf(),
            reason: "top level must be a mapping".to_string(),
        }),
    }
}

/// Write `contents` to a temp file beside `path`, ready to be renamed over it.
fn stage(path: &Path, contents: &str) -> ConfigResult<NamedTempFile> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(contents.as_bytes()).map_err(write_err)?;
    if let Ok(metadata) = std::fs::metadata(path) {
        file.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_err)?;
    }
    file.as_file().sync_all().map_err(write_err)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(variable: &'static str, raw: &str) -> EnvOverlayRecord {
        EnvOverlayRecord {
            target: OverlayTarget::Devices,
            variable,
            key: variable.trim_start_matches("device_").to_string(),
            raw: raw.to_string(),
        }
    }

    #[test]
    fn test_coerce_by_declared_kind() {
        let r = record("device_interval", " 30 ");
        assert_eq!(coerce(&r, Some(ValueKind::Integer)).unwrap(), Value::from(30));

        let r = record("device_enabled", "TRUE");
        assert_eq!(coerce(&r, Some(ValueKind::Boolean)).unwrap(), Value::Bool(true));

        let r = record("device_scale", "0.5");
        assert_eq!(coerce(&r, Some(ValueKind::Float)).unwrap(), Value::from(0.5));

        let r = record("device_name", "1234");
        assert_eq!(
            coerce(&r, Some(ValueKind::String)).unwrap(),
            Value::String("1234".into())
        );
        assert_eq!(coerce(&r, None).unwrap(), Value::String("1234".into()));
    }

    #[test]
    fn test_coerce_rejects_bad_values() {
        let r = record("device_interval", "not_a_number");
        let err = coerce(&r, Some(ValueKind::Integer)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Coercion { ref variable, expected: ValueKind::Integer, .. }
                if variable == "device_interval"
        ));

        let r = record("device_enabled", "yes");
        assert!(coerce(&r, Some(ValueKind::Boolean)).is_err());

        let r = record("device_scale", "NaN");
        assert!(coerce(&r, Some(ValueKind::Float)).is_err());

        let r = record("device_tags", "a,b");
        assert!(coerce(&r, Some(ValueKind::Sequence)).is_err());
    }
}
