//! Schema-validated configuration for a sensor-to-MQTT bridge.
//!
//! Configuration lives in a directory with one YAML file per section
//! (`mqtt.yaml`, `device.yaml`, ...). Loading happens in two steps:
//! 1. **Overlay** - recognized environment variables are written back into
//!    their section files ([`sync_env_overlay`])
//! 2. **Load** - all files are merged over the defaults, then validated and
//!    stripped against a [`SchemaNode`] ([`Config::load`])
//!
//! The overlay must run to completion before the directory is loaded.
//!
//! ## Environment Variables
//! - `device_name`, `device_address`, `device_type`, `device_topic`,
//!   `device_interval` - written to `devices: [ {...} ]` in `device.yaml`
//! - `mqtt_host`, `mqtt_port`, `mqtt_auth_username`, `mqtt_auth_password` -
//!   written to `mqtt: {...}` in `mqtt.yaml`
//! - `BRIDGE_CONFIG_DIR` - config directory (default: `./config`)

pub mod env;
mod loader;
mod merge;
mod overlay;
mod render;
mod schema;
mod validate;

pub use env::{EnvOverlayRecord, EnvSource, MapEnv, OverlayTarget, ProcessEnv, RECOGNIZED_VARS};
pub use loader::{CONFIG_DIR_ENV, Config, ConfigPaths, load_directory};
pub use merge::{merge_layer, merge_layers};
pub use overlay::{OverlayFile, OverlayOutcome, coerce, sync_env_overlay, sync_from_process_env};
pub use render::render_yaml;
pub use schema::{SchemaNode, ValueKind, describe};
pub use validate::{ValidationReport, is_falsy, strip, validate};
