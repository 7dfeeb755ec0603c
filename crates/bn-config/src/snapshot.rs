//! Network snapshots for reproducible results.
//!
//! A snapshot records which network an answer was computed from: where it
//! came from, a content hash, and its size. Two runs with equal hashes used
//! the same tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::network::NetworkSpec;
use crate::resolve::ConfigSource;

/// A frozen record of the network in use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Hostname where snapshot was taken.
    #[serde(default)]
    pub hostname: Option<String>,

    pub schema_version: String,

    /// Network name from the file or preset.
    pub name: String,

    /// Source of the network definition.
    pub source: String,

    /// Path the network was loaded from (None for presets).
    #[serde(default)]
    pub path: Option<String>,

    /// SHA-256 of the canonical JSON form of the network; None if it
    /// could not be serialized.
    #[serde(default)]
    pub content_hash: Option<String>,

    pub node_count: usize,
    pub edge_count: usize,
}

impl NetworkSnapshot {
    /// Create a new snapshot of a loaded network.
    pub fn new(spec: &NetworkSpec, source: ConfigSource, path: Option<&str>) -> Self {
        let hostname = hostname::get()
            .ok()
            .map(|h| h.to_string_lossy().to_string());

        NetworkSnapshot {
            timestamp: Utc::now(),
            hostname,
            schema_version: spec.schema_version.clone(),
            name: spec.name.clone(),
            source: source.to_string(),
            path: path.map(str::to_string),
            content_hash: hash_spec(spec),
            node_count: spec.nodes.len(),
            edge_count: spec.edge_count(),
        }
    }

    /// Whether two snapshots describe the same tables.
    ///
    /// False when either hash is missing.
    pub fn same_network(&self, other: &NetworkSnapshot) -> bool {
        match (&self.content_hash, &other.content_hash) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Short hash prefix for display.
    pub fn short_hash(&self) -> &str {
        match &self.content_hash {
            Some(hash) => &hash[..hash.len().min(12)],
            None => "unavailable",
        }
    }
}

/// SHA-256 of the network's canonical JSON.
///
/// The JSON form is used rather than file bytes so the same network written
/// as TOML or YAML hashes identically.
pub fn hash_spec(spec: &NetworkSpec) -> Option<String> {
    let canonical = serde_json::to_string(spec).ok()?;
    Some(hash_content(&canonical))
}

/// Compute SHA-256 hash of content.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
