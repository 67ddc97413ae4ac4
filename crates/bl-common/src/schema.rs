//! Schema versioning for machine-readable output.

/// Version of the JSON output contract emitted by bl-core.
///
/// Bump the major component on breaking field changes.
pub const SCHEMA_VERSION: &str = "1.0.0";
