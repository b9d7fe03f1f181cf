//! Raw row types produced by database clients.
//!
//! Backends translate their native column types into [`Value`], a closed set of
//! kinds. Anything a backend cannot classify is carried as
//! [`Value::Unsupported`] with the engine's type name, so later stages can
//! reject it by name instead of guessing a representation.

use futures::stream::BoxStream;

use crate::error::Result;

/// A single row as returned by the database: column name and value, in
/// column order.
pub type RawRow = Vec<(String, Value)>;

/// A stream of raw rows, ending early on the first error.
pub type RowStream<'a> = BoxStream<'a, Result<RawRow>>;

/// Represents a single value from a database query.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text value.
    String(String),

    /// Binary data, including text delivered as raw bytes.
    Bytes(Vec<u8>),

    /// A column type the backend does not decode; holds the engine's type name.
    Unsupported(String),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind(&self) -> &str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOL",
            Value::Int(_) => "INT",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "TEXT",
            Value::Bytes(_) => "BYTES",
            Value::Unsupported(type_name) => type_name,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}
