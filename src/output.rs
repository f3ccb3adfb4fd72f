//! JSON rendering for document values.
//!
//! Used when a composite value is spliced into interpolated text and by the
//! command line `--format json` output. Mapping keys are written in document
//! order; serde_json's `preserve_order` feature keeps object entries in
//! insertion order. Non-finite floats become `null`.
//!
//! # Examples
//!
//! ```
//! use yamlexpr::Value;
//! use yamlexpr::output::{to_json, to_json_pretty};
//!
//! let value = Value::Sequence(vec![Value::Integer(1), Value::from("two")]);
//! assert_eq!(to_json(&value), r#"[1,"two"]"#);
//! assert_eq!(to_json_pretty(&Value::Integer(42)), "42");
//! ```

use crate::convert::value_to_json;
use crate::value::Value;

/// Compact JSON with no extra whitespace.
pub fn to_json(value: &Value) -> String {
    value_to_json(value).to_string()
}

/// JSON with 2-space indentation, one element or entry per line.
pub fn to_json_pretty(value: &Value) -> String {
    format!("{:#}", value_to_json(value))
}
