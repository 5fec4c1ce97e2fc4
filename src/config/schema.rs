//! Declarative schema describing the expected shape of a config tree.
//!
//! A [`SchemaNode`] describes one section: scalar entries that must or may be
//! present, child schemas for nested sections and lists, and (for lists) a
//! minimum element count. Nodes deserialize from YAML so an embedding
//! application can ship its schema as a file:
//!
//! ```yaml
//! required_entries:
//!   mqtt: mapping
//! children:
//!   mqtt:
//!     required_entries: { host: string, port: integer }
//!   devices:
//!     minimum: 1
//!     required_entries: { address: string }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Runtime kind a schema entry expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[serde(alias = "int")]
    Integer,
    Float,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "str")]
    String,
    #[serde(alias = "list")]
    Sequence,
    #[serde(alias = "dict", alias = "map")]
    Mapping,
}

impl ValueKind {
    /// Kind of a tree value, or `None` for null.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ValueKind::Boolean),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(ValueKind::Integer),
            Value::Number(_) => Some(ValueKind::Float),
            Value::String(_) => Some(ValueKind::String),
            Value::Array(_) => Some(ValueKind::Sequence),
            Value::Object(_) => Some(ValueKind::Mapping),
        }
    }

    /// Strict kind check: booleans are never integers and integers are never floats.
    pub fn matches(self, value: &Value) -> bool {
        Self::of(value) == Some(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::String => "string",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable kind name of a tree value, including null.
pub fn describe(value: &Value) -> &'static str {
    ValueKind::of(value).map_or("null", ValueKind::as_str)
}

/// Schema for one config section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaNode {
    /// Fields that must be present (and truthy) with the given kind.
    pub required_entries: BTreeMap<String, ValueKind>,
    /// Fields that, when present, must have the given kind.
    pub optional_entries: BTreeMap<String, ValueKind>,
    /// Schemas for nested sections, or element schemas for nested lists.
    pub children: BTreeMap<String, SchemaNode>,
    /// Minimum element count when this node is applied to a list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<usize>,
}

impl SchemaNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, key: impl Into<String>, kind: ValueKind) -> Self {
        self.required_entries.insert(key.into(), kind);
        self
    }

    pub fn optional(mut self, key: impl Into<String>, kind: ValueKind) -> Self {
        self.optional_entries.insert(key.into(), kind);
        self
    }

    pub fn child(mut self, key: impl Into<String>, schema: SchemaNode) -> Self {
        self.children.insert(key.into(), schema);
        self
    }

    pub fn minimum(mut self, minimum: usize) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Declared kind for a field, consulting required entries first.
    pub fn entry_kind(&self, key: &str) -> Option<ValueKind> {
        self.required_entries
            .get(key)
            .or_else(|| self.optional_entries.get(key))
            .copied()
    }

    /// Whether stripping keeps `key` in a mapping checked against this node.
    pub fn allows(&self, key: &str) -> bool {
        self.required_entries.contains_key(key)
            || self.optional_entries.contains_key(key)
            || self.children.contains_key(key)
    }

    /// Parse a schema from YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Built-in schema for a sensor bridge: one MQTT broker, one or more devices.
    pub fn bridge() -> Self {
        let mqtt = SchemaNode::new()
            .required("host", ValueKind::String)
            .required("port", ValueKind::Integer)
            .optional("keepalive", ValueKind::Integer)
            .optional("auth_username", ValueKind::String)
            .optional("auth_password", ValueKind::String);

        let devices = SchemaNode::new()
            .required("name", ValueKind::String)
            .required("address", ValueKind::String)
            .required("type", ValueKind::String)
            .optional("topic", ValueKind::String)
            .optional("interval", ValueKind::Integer)
            .minimum(1);

        SchemaNode::new()
            .required("mqtt", ValueKind::Mapping)
            .required("devices", ValueKind::Sequence)
            .child("mqtt", mqtt)
            .child("devices", devices)
    }
}
