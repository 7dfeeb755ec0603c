//! bayesnet network definition files.
//!
//! This crate provides:
//! - Typed Rust structs for network files (JSON, TOML, or YAML on disk)
//! - Network file resolution (CLI → env → XDG)
//! - Shape and label validation
//! - Built-in example networks (presets)
//! - Snapshots recording which network a result came from

pub mod network;
pub mod preset;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use network::{network_json_schema, NetworkSpec, NodeSpec, RowSpec, TableSpec};
pub use preset::{get_preset, list_presets, PresetError, PresetInfo, PresetName};
pub use resolve::{resolve_network, ConfigSource, NetworkPath};
pub use snapshot::NetworkSnapshot;
pub use validate::{validate_network_spec, ValidationError, ValidationResult};

/// Schema version for network files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
