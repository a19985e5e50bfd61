//! JSON output for search responses.
//!
//! Field omission (zero totals, zero statistics, no suggestions) is decided by
//! the serde attributes on [`QueryResult`]; this module only picks the layout.
//!
//! # Examples
//!
//! ```
//! use carserv::QueryResult;
//! use carserv::output::{to_json, to_json_pretty};
//!
//! let mut result = QueryResult::default();
//! assert_eq!(to_json(&result).unwrap(), "{}");
//!
//! result.total_vehicles = 16;
//! assert_eq!(to_json(&result).unwrap(), r#"{"total_vehicles":16}"#);
//! assert_eq!(to_json_pretty(&result).unwrap(), "{\n  \"total_vehicles\": 16\n}");
//! ```

use crate::model::QueryResult;

/// Compact, single-line JSON.
pub fn to_json(result: &QueryResult) -> Result<String, serde_json::Error> {
    serde_json::to_string(result)
}

/// JSON with 2-space indentation.
pub fn to_json_pretty(result: &QueryResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

