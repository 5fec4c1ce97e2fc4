//! Bridge Config Library
//!
//! Schema validation, stripping, and environment overlay for the YAML
//! configuration of a sensor-to-MQTT bridge.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;

pub use config::{Config, SchemaNode, ValueKind};
pub use error::{ConfigError, ConfigResult, IssueKind, ValidationIssue};
