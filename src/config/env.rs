//! Recognized environment variables and their target config sections.
//!
//! Variables prefixed `mqtt_` target the broker section in `mqtt.yaml`; the
//! rest target the device section in `device.yaml`. The prefix is stripped to
//! form the field key, so `mqtt_auth_username` becomes `auth_username`.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Environment variable names that feed the overlay, in the order they are read.
pub const RECOGNIZED_VARS: &[&str] = &[
    "device_name",
    "device_address",
    "device_type",
    "device_topic",
    "device_interval",
    "mqtt_host",
    "mqtt_port",
    "mqtt_auth_username",
    "mqtt_auth_password",
];

/// Source of environment variable values.
///
/// Lets the overlay be exercised without touching the process environment.
pub trait EnvSource {
    fn get(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment backed by a map.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Config section an environment variable is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayTarget {
    /// `mqtt.yaml`, stored as a single mapping under `mqtt`.
    Mqtt,
    /// `device.yaml`, stored as a one-element list under `devices`.
    Devices,
}

impl OverlayTarget {
    pub const ALL: [OverlayTarget; 2] = [OverlayTarget::Mqtt, OverlayTarget::Devices];

    pub fn file_name(self) -> &'static str {
        match self {
            OverlayTarget::Mqtt => "mqtt.yaml",
            OverlayTarget::Devices => "device.yaml",
        }
    }

    /// Top-level key in the file, which is also the child schema name.
    pub fn section_key(self) -> &'static str {
        match self {
            OverlayTarget::Mqtt => "mqtt",
            OverlayTarget::Devices => "devices",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            OverlayTarget::Mqtt => "mqtt_",
            OverlayTarget::Devices => "device_",
        }
    }

    fn for_variable(name: &str) -> Self {
        if name.starts_with(OverlayTarget::Mqtt.prefix()) {
            OverlayTarget::Mqtt
        } else {
            OverlayTarget::Devices
        }
    }

    /// Shape the overlay entries the way this section is stored.
    pub fn wrap(self, entries: Map<String, Value>) -> Value {
        match self {
            OverlayTarget::Mqtt => Value::Object(entries),
            OverlayTarget::Devices => Value::Array(vec![Value::Object(entries)]),
        }
    }
}

impl std::fmt::Display for OverlayTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.section_key())
    }
}

/// One environment variable that was set, routed to its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverlayRecord {
    pub target: OverlayTarget,
    pub variable: &'static str,
    /// Field key inside the section (variable name minus prefix).
    pub key: String,
    pub raw: String,
}

/// Read every recognized variable that is set.
pub fn collect_overlay(env: &impl EnvSource) -> Vec<EnvOverlayRecord> {
    RECOGNIZED_VARS
        .iter()
        .filter_map(|&variable| {
            let raw = env.get(variable)?;
            let target = OverlayTarget::for_variable(variable);
            let key = variable
                .strip_prefix(target.prefix())
                .unwrap_or(variable)
                .to_string();
            Some(EnvOverlayRecord {
                target,
                variable,
                key,
                raw,
            })
        })
        .collect()
}
