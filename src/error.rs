//! Error types for config loading, overlay sync, and validation reporting.

use crate::config::ValueKind;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while loading config or syncing the environment overlay.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config path is missing or is not a directory.
    #[error("{} is not a directory", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Reading a config file failed.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file is not well-formed YAML.
    #[error("failed to parse YAML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A config file parsed, but its document shape is unusable.
    #[error("invalid config document {}: {reason}", path.display())]
    InvalidDocument { path: PathBuf, reason: String },

    /// Accessor lookup for a top-level key that is not in the config.
    #[error("key {0} not in config")]
    KeyNotFound(String),

    /// An environment value could not be converted to its declared kind.
    #[error("cannot use {variable}={value:?}: expected {expected}")]
    Coercion {
        variable: String,
        value: String,
        expected: ValueKind,
    },

    /// Writing a config file failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for config operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Category of a single validation failure.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    MissingRequiredField,
    TypeMismatch,
    OptionalTypeMismatch,
    BelowMinimum,
    ExpectedSection,
}

/// One failed check found while validating a config tree.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    /// Offending field, or the section/list key for minimum and section errors.
    pub key: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<ValueKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl ValidationIssue {
    pub fn new(kind: IssueKind, key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    pub fn with_expected(mut self, expected: ValueKind) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    // Convenience constructors

    pub fn missing_field(field: &str, section: &str) -> Self {
        Self::new(
            IssueKind::MissingRequiredField,
            field,
            format!("Missing required field '{}' in '{}'", field, section),
        )
    }

    pub fn type_mismatch(field: &str, expected: ValueKind, actual: &str) -> Self {
        Self::new(
            IssueKind::TypeMismatch,
            field,
            format!("Value of '{}' must be {}, was {}", field, expected, actual),
        )
        .with_expected(expected)
        .with_actual(actual)
    }

    pub fn optional_type_mismatch(field: &str, expected: ValueKind, actual: &str) -> Self {
        Self::new(
            IssueKind::OptionalTypeMismatch,
            field,
            format!(
                "Value of optional entry '{}' must be {}, was {}",
                field, expected, actual
            ),
        )
        .with_expected(expected)
        .with_actual(actual)
    }

    pub fn below_minimum(key: &str, minimum: usize, len: usize) -> Self {
        Self::new(
            IssueKind::BelowMinimum,
            key,
            format!("'{}' needs to have at least {} entries", key, minimum),
        )
        .with_actual(len.to_string())
    }

    pub fn expected_section(key: &str, actual: &str) -> Self {
        Self::new(
            IssueKind::ExpectedSection,
            key,
            format!("'{}' must be a mapping or list, was {}", key, actual),
        )
        .with_actual(actual)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
