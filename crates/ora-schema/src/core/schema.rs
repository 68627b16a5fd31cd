//! Table, column, and index models.
//!
//! These are transient snapshots: introspection builds them fresh on every
//! call and write operations only read them.

use serde::{Deserialize, Serialize};

/// Table metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
}

impl TableInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Column metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Native data type (e.g., "NUMBER(11, 0)", "NVARCHAR2(50)").
    ///
    /// Introspection reports the bare catalog type name ("NUMBER").
    pub data_type: String,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Whether the column is part of the primary key.
    pub is_key: bool,

    /// Whether the column is backed by a sequence + insert trigger.
    pub is_auto_increment: bool,

    /// Catalog ordinal position (1-based).
    pub order: i32,

    /// Precision for NUMBER, byte length for RAW, character length otherwise.
    pub max_length: i32,

    /// Scale for NUMBER, zero otherwise.
    pub min_length: i32,

    /// Indexes this column participates in.
    #[serde(default)]
    pub indexes: Vec<IndexInfo>,
}

impl ColumnInfo {
    /// A nullable, non-key column.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            ..Default::default()
        }
    }

    /// Mark as a NOT NULL primary key member.
    #[must_use]
    pub fn key(mut self) -> Self {
        self.is_key = true;
        self.is_nullable = false;
        self
    }

    /// Mark as auto-increment.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }

    /// Set nullability.
    #[must_use]
    pub fn nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    /// Declare an index on this column.
    #[must_use]
    pub fn with_index(mut self, name: impl Into<String>, is_unique: bool) -> Self {
        let column_name = self.name.clone();
        self.indexes.push(IndexInfo {
            name: name.into(),
            column_name,
            is_unique,
        });
        self
    }
}

/// One (index, column) membership.
///
/// A multi-column index appears as several entries sharing `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    /// Index name.
    pub name: String,

    /// Indexed column name.
    pub column_name: String,

    /// Whether the index is unique.
    pub is_unique: bool,
}

impl IndexInfo {
    pub fn new(name: impl Into<String>, column_name: impl Into<String>, is_unique: bool) -> Self {
        Self {
            name: name.into(),
            column_name: column_name.into(),
            is_unique,
        }
    }

    /// Whether both the index name and the column name are present.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.column_name.is_empty()
    }
}
