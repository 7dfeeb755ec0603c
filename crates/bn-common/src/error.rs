//! Error types for bayesnet.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Invalid Query
//!   Reason: invalid query: evidence variable 'Fog' is not in the network
//!   Fix: Run 'bn-core describe' to list node names and their domains.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 30,
//!   "category": "query",
//!   "message": "invalid query: evidence variable 'Fog' is not in the network",
//!   "recoverable": true
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for bayesnet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Network file discovery, parsing, and presets.
    Config,
    /// Network structure and table completeness.
    Structure,
    /// Inference requests and evaluation.
    Query,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Structure => write!(f, "structure"),
            ErrorCategory::Query => write!(f, "query"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for bayesnet.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("invalid network file {path}: {message}")]
    InvalidNetworkFile { path: String, message: String },

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("no network given: pass --network <file> or --preset <name>")]
    NoNetwork,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Structure errors (20-29)
    #[error("structural error: {0}")]
    Structural(String),

    #[error("incomplete probability table: {0}")]
    IncompleteTable(String),

    // Query errors (30-39)
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("missing table entry: {0}")]
    MissingTableEntry(String),

    #[error("missing assignment: {0}")]
    MissingAssignment(String),

    #[error("evidence has zero probability: {evidence}")]
    ZeroEvidence { evidence: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Structure errors
    /// - 30-39: Query errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidNetworkFile { .. } => 11,
            Error::UnknownPreset(_) => 12,
            Error::NoNetwork => 13,
            Error::InvalidArgument(_) => 14,
            Error::Structural(_) => 20,
            Error::IncompleteTable(_) => 21,
            Error::InvalidQuery(_) => 30,
            Error::MissingTableEntry(_) => 31,
            Error::MissingAssignment(_) => 32,
            Error::ZeroEvidence { .. } => 33,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidNetworkFile { .. }
            | Error::UnknownPreset(_)
            | Error::NoNetwork
            | Error::InvalidArgument(_) => ErrorCategory::Config,

            Error::Structural(_) | Error::IncompleteTable(_) => ErrorCategory::Structure,

            Error::InvalidQuery(_)
            | Error::MissingTableEntry(_)
            | Error::MissingAssignment(_)
            | Error::ZeroEvidence { .. } => ErrorCategory::Query,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether a corrected request could succeed.
    ///
    /// None of these errors are transient: recoverable means the caller can
    /// fix the input and retry, not that retrying as-is will help.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::InvalidNetworkFile { .. } => true,
            Error::UnknownPreset(_) => true,
            Error::NoNetwork => true,
            Error::InvalidArgument(_) => true,

            // The model itself is broken; the file must be rewritten.
            Error::Structural(_) => false,
            Error::IncompleteTable(_) => false,

            Error::InvalidQuery(_) => true,
            Error::MissingTableEntry(_) => false,
            Error::MissingAssignment(_) => true,
            Error::ZeroEvidence { .. } => true,

            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::InvalidNetworkFile { .. } => {
                "Run 'bn-core check --network <file>' for details, or 'bn-core schema' for the expected layout."
            }
            Error::UnknownPreset(_) => "Run 'bn-core presets' to list the built-in networks.",
            Error::NoNetwork => "Pass --network <file>, set BAYESNET_NETWORK, or use --preset rain.",
            Error::InvalidArgument(_) => "Write assignments as Node=value pairs separated by commas.",

            Error::Structural(_) => {
                "Declare every parent before its children and give each node a non-empty, duplicate-free domain."
            }
            Error::IncompleteTable(_) => {
                "Give every node a table with one row per combination of parent values, each summing to 1."
            }

            Error::InvalidQuery(_) => "Run 'bn-core describe' to list node names and their domains.",
            Error::MissingTableEntry(_) => {
                "The network's tables have gaps. Run 'bn-core check' to list the missing rows."
            }
            Error::MissingAssignment(_) => "Assign a value to every node in the network.",
            Error::ZeroEvidence { .. } => {
                "The observed combination is impossible under this model. Relax the evidence or revisit the tables."
            }

            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq . <file>'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::InvalidNetworkFile { .. } => "Invalid Network File",
            Error::UnknownPreset(_) => "Unknown Preset",
            Error::NoNetwork => "No Network",
            Error::InvalidArgument(_) => "Invalid Argument",
            Error::Structural(_) => "Invalid Network Structure",
            Error::IncompleteTable(_) => "Incomplete Probability Table",
            Error::InvalidQuery(_) => "Invalid Query",
            Error::MissingTableEntry(_) => "Missing Table Entry",
            Error::MissingAssignment(_) => "Missing Assignment",
            Error::ZeroEvidence { .. } => "Impossible Evidence",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether a corrected request could succeed.
    pub recoverable: bool,

    /// Remediation hint.
    pub remediation: String,

    /// Additional structured context (e.g., file path).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::InvalidNetworkFile { path, .. } => {
                context.insert("path".to_string(), serde_json::json!(path));
            }
            Error::UnknownPreset(name) => {
                context.insert("preset".to_string(), serde_json::json!(name));
            }
            Error::ZeroEvidence { evidence } => {
                context.insert("evidence".to_string(), serde_json::json!(evidence));
            }
            _ => {}
        }

        ErrorReport {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            remediation: err.remediation().to_string(),
            context,
        }
    }
}

impl ErrorReport {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
