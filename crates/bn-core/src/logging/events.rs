//! Structured event definitions for logging.
//!
//! Events follow a consistent schema for machine-parseable JSONL output.
//! All events carry the run ID and a stage; the network name is attached
//! once one has been loaded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Processing stages of one CLI invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and argument handling.
    Init,
    /// Network file or preset loading.
    Load,
    /// Table completeness checks.
    Validate,
    /// Enumeration inference.
    Infer,
    /// Rendering the payload.
    Output,
}

impl Stage {
    /// Inverse of `Display`.
    pub fn parse(s: &str) -> Option<Stage> {
        match s {
            "init" => Some(Stage::Init),
            "load" => Some(Stage::Load),
            "validate" => Some(Stage::Validate),
            "infer" => Some(Stage::Infer),
            "output" => Some(Stage::Output),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Validate => "validate",
            Stage::Infer => "infer",
            Stage::Output => "output",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names, used as tracing targets.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Load stage
    pub const NETWORK_RESOLVED: &str = "network.resolved";
    pub const NETWORK_LOADED: &str = "network.loaded";
    pub const NETWORK_INVALID: &str = "network.invalid";

    // Infer stage
    pub const INFER_STARTED: &str = "infer.started";
    pub const INFER_VALUE_SCORED: &str = "infer.value_scored";
    pub const INFER_ZERO_EVIDENCE: &str = "infer.zero_evidence";
    pub const INFER_FINISHED: &str = "infer.finished";

    // Output stage
    pub const QUERY_ANSWERED: &str = "query.answered";

    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// A structured log event for JSONL output.
///
/// Built by [`JsonlLayer`](super::JsonlLayer) from each tracing event.
/// Correlation fields are absent for events raised below the CLI, such as
/// those from the inference engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub ts: DateTime<Utc>,
    pub level: Level,

    /// Event name (e.g., "run.started", "infer.finished").
    pub event: String,

    /// Unique ID for this invocation of bn-core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,

    /// Name of the network in use, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Additional structured fields (stable keys).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogEvent {
    pub fn new(level: Level, event: impl Into<String>) -> Self {
        LogEvent {
            ts: Utc::now(),
            level,
            event: event.into(),
            run_id: None,
            host_id: None,
            network: None,
            stage: None,
            message: None,
            fields: serde_json::Map::new(),
        }
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Add a field to the event.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
        self
    }

    /// Serialize to a single JSON line.
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"serialization_failed","event":"{}"}}"#,
                self.event
            )
        })
    }
}

/// Correlation IDs shared by every event of one run.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub host_id: String,
    pub network: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>, host_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            host_id: host_id.into(),
            network: None,
        }
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Network name as a tracing field value; empty until one is loaded.
    pub fn network_field(&self) -> &str {
        self.network.as_deref().unwrap_or("")
    }
}
