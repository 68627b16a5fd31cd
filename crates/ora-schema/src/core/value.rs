//! Row and value types returned by catalog queries.
//!
//! Catalog views only ever hand back names, flags, text bodies and small
//! integers, so the value model is deliberately narrow. Typed row records in
//! [`crate::catalog::rows`] are built from these through [`FromRow`].

use crate::error::{Result, SchemaError};

/// A single value read from a catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,

    /// Integer value (NUMBER columns without scale).
    Int(i64),

    /// Character data (VARCHAR2, CHAR, LONG).
    Text(String),
}

impl SqlValue {
    /// Interpret the value as an integer.
    ///
    /// Drivers that fetch everything as text are tolerated: numeric text is
    /// parsed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Null => None,
            SqlValue::Int(v) => Some(*v),
            SqlValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Convert to owned text, rendering integers in decimal.
    pub fn into_string(self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Int(v) => Some(v.to_string()),
            SqlValue::Text(s) => Some(s),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// A positional result row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    /// Create a row from its column values, in select-list order.
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value at `idx`.
    pub fn value(&self, idx: usize) -> Result<&SqlValue> {
        self.values.get(idx).ok_or_else(|| {
            SchemaError::row(format!(
                "column index {} out of range (row has {} columns)",
                idx,
                self.values.len()
            ))
        })
    }

    /// Non-null text at `idx`.
    pub fn get_string(&self, idx: usize) -> Result<String> {
        self.get_opt_string(idx)?
            .ok_or_else(|| SchemaError::row(format!("column {} is NULL", idx)))
    }

    /// Nullable text at `idx`.
    pub fn get_opt_string(&self, idx: usize) -> Result<Option<String>> {
        Ok(self.value(idx)?.clone().into_string())
    }

    /// Non-null integer at `idx`.
    pub fn get_i64(&self, idx: usize) -> Result<i64> {
        self.get_opt_i64(idx)?
            .ok_or_else(|| SchemaError::row(format!("column {} is not an integer", idx)))
    }

    /// Nullable integer at `idx`.
    pub fn get_opt_i64(&self, idx: usize) -> Result<Option<i64>> {
        let value = self.value(idx)?;
        match value {
            SqlValue::Null => Ok(None),
            other => other
                .as_i64()
                .map(Some)
                .ok_or_else(|| SchemaError::row(format!("column {} is not an integer: {:?}", idx, other))),
        }
    }
}

/// Build a typed record from a positional row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self>;
}

/// Single-column text rows (name lists).
impl FromRow for String {
    fn from_row(row: &Row) -> Result<Self> {
        row.get_string(0)
    }
}
