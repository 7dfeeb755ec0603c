//! bayesnet common types and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - Application error type with stable codes
//! - Output format specifications
//! - Schema versioning for machine-readable payloads

pub mod error;
pub mod output;
pub mod schema;

pub use error::{Error, ErrorCategory, ErrorReport, Result};
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
