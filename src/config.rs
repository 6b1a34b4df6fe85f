//! Configuration constants for the migration tool
//!
//! This module centralizes defaults, timeouts and the CSV column names the
//! pipelines look up by name.

use std::time::Duration;

// ============================================================================
// Engine Connection Configuration
// ============================================================================

pub const DEFAULT_HOST: &str = "localhost";

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_USER: &str = "admin";

/// Value sent in `X-Trino-Source` so statements are attributable in the UI
pub const CLIENT_SOURCE: &str = "trino-migrate";

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for a whole statement, including every `nextUri` page
///
/// CTAS over a large source table can run for a while, so this is generous.
/// Expiry fails the current row only.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(180); // 3 minutes

/// Bound on the best-effort cancel sent for a statement that timed out
pub const CANCEL_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Job List Columns
// ============================================================================

pub const COL_TYPE: &str = "type";
pub const COL_SOURCE_CATALOG: &str = "Source Catalog";
pub const COL_SOURCE_SCHEMA: &str = "Source Schema";
pub const COL_SOURCE_TABLE: &str = "Source Table";
pub const COL_TARGET_CATALOG: &str = "Target catalog";
pub const COL_TARGET_SCHEMA: &str = "Target Schema";
pub const COL_TARGET_TABLE: &str = "Target Table Name";

/// Column appended to the output holding the generated statement
pub const COL_GENERATED_QUERY: &str = "Generated CTAS Query";

// ============================================================================
// Introspection
// ============================================================================

/// DESCRIBE emits partition summary pseudo-rows whose first field starts with this
pub const COMMENT_MARKER: char = '#';
