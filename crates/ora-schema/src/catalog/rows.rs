//! Typed records for catalog query results.
//!
//! Each record mirrors the select list of one query in [`super`]; the
//! positional layout is fixed there and decoded here.

use crate::core::schema::TableInfo;
use crate::core::value::{FromRow, Row};
use crate::error::{Result, SchemaError};

/// One row of `ALL_TAB_COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabColumnRow {
    pub column_id: i32,
    pub column_name: String,
    pub data_type: String,
    pub data_length: Option<i32>,
    pub char_length: Option<i32>,
    pub data_precision: Option<i32>,
    pub data_scale: Option<i32>,
    /// `Y` or `N`.
    pub nullable: String,
}

impl TabColumnRow {
    pub fn is_nullable(&self) -> bool {
        self.nullable.eq_ignore_ascii_case("Y")
    }

    /// `(max_length, min_length)` as reported for this column's type.
    ///
    /// NUMBER reports precision and scale, RAW its byte length, everything
    /// else its character length.
    pub fn lengths(&self) -> (i32, i32) {
        if self.data_type.eq_ignore_ascii_case("NUMBER") {
            (
                self.data_precision.unwrap_or(0),
                self.data_scale.unwrap_or(0),
            )
        } else if self.data_type.eq_ignore_ascii_case("RAW") {
            (self.data_length.unwrap_or(0), 0)
        } else {
            (self.char_length.unwrap_or(0), 0)
        }
    }
}

impl FromRow for TabColumnRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            column_id: to_i32(row.get_i64(0)?)?,
            column_name: row.get_string(1)?,
            data_type: row.get_string(2)?,
            data_length: opt_i32(row.get_opt_i64(3)?)?,
            char_length: opt_i32(row.get_opt_i64(4)?)?,
            data_precision: opt_i32(row.get_opt_i64(5)?)?,
            data_scale: opt_i32(row.get_opt_i64(6)?)?,
            nullable: row.get_opt_string(7)?.unwrap_or_else(|| "Y".to_string()),
        })
    }
}

/// One INSERT trigger from `ALL_TRIGGERS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRow {
    pub trigger_name: String,
    pub trigger_body: String,
}

impl FromRow for TriggerRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            trigger_name: row.get_string(0)?,
            trigger_body: row.get_opt_string(1)?.unwrap_or_default(),
        })
    }
}

/// One (index, column) pair from `ALL_IND_COLUMNS` joined to `ALL_INDEXES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumnRow {
    pub index_name: String,
    pub column_name: String,
    /// `UNIQUE` or `NONUNIQUE`.
    pub uniqueness: String,
}

impl IndexColumnRow {
    pub fn is_unique(&self) -> bool {
        self.uniqueness.eq_ignore_ascii_case("UNIQUE")
    }
}

impl FromRow for IndexColumnRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            index_name: row.get_string(0)?,
            column_name: row.get_string(1)?,
            uniqueness: row.get_opt_string(2)?.unwrap_or_default(),
        })
    }
}

impl FromRow for TableInfo {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(TableInfo::new(row.get_string(0)?))
    }
}

fn to_i32(v: i64) -> Result<i32> {
    i32::try_from(v).map_err(|_| SchemaError::row(format!("value {} out of range for i32", v)))
}

fn opt_i32(v: Option<i64>) -> Result<Option<i32>> {
    v.map(to_i32).transpose()
}
