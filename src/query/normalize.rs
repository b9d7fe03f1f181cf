//! Conversion of raw database rows into JSON-safe result rows.
//!
//! Only text and byte values have a string form. Every other kind, NULL
//! included, is rejected instead of being formatted, and a single rejected
//! value fails the whole row.

use std::collections::BTreeMap;

use crate::db::{RawRow, Value};
use crate::error::{ApiError, Result};

/// One result row: column name to string value.
pub type ResultRow = BTreeMap<String, String>;

/// All rows of one call, in the database's order.
pub type ResultSet = Vec<ResultRow>;

/// Converts every column of `row` to a string, failing on the first value
/// without a defined conversion.
pub fn normalize_row(row: RawRow) -> Result<ResultRow> {
    row.into_iter()
        .map(|(column, value)| {
            let text = normalize_value(&column, value)?;
            Ok((column, text))
        })
        .collect()
}

fn normalize_value(column: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Bytes(bytes) => Ok(match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }),
        Value::Null
        | Value::Bool(_)
        | Value::Int(_)
        | Value::Float(_)
        | Value::Unsupported(_) => Err(ApiError::unsupported_type(column, value.kind())),
    }
}
