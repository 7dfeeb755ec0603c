//! Schema versioning for CLI payloads.

/// Version of the JSON payloads printed by the CLI.
///
/// Bumped whenever a field is renamed or removed.
pub const SCHEMA_VERSION: &str = "1.0.0";
