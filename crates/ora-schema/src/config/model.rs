//! Schema model files: the logical tables a caller wants to exist.
//!
//! ```yaml
//! tables:
//!   - name: Users
//!     columns:
//!       - { name: Id, type: int32, key: true, auto_increment: true }
//!       - name: Name
//!         type: string
//!         max_length: 100
//!         indexes: [{ name: IX_USERS_NAME }]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::schema::{ColumnInfo, IndexInfo};
use crate::error::{Result, SchemaError};
use crate::typemap::LogicalType;

/// Root of a schema model file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaModel {
    #[serde(default)]
    pub tables: Vec<TableModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableModel {
    pub name: String,

    #[serde(default)]
    pub columns: Vec<ColumnModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnModel {
    pub name: String,

    /// Logical type, mapped through the type table.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub logical_type: Option<LogicalType>,

    /// Native Oracle type, used verbatim. Takes precedence over `type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    #[serde(default)]
    pub max_length: i32,

    #[serde(default)]
    pub min_length: i32,

    /// Defaults to true unless the column is a key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    #[serde(default)]
    pub key: bool,

    #[serde(default)]
    pub auto_increment: bool,

    #[serde(default)]
    pub indexes: Vec<IndexModel>,
}

/// An index the column belongs to. Columns sharing a name form one index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexModel {
    pub name: String,

    #[serde(default)]
    pub unique: bool,
}

impl SchemaModel {
    /// Load a model from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a model from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let model: SchemaModel = serde_yaml::from_str(yaml)?;
        model.validate()?;
        Ok(model)
    }

    /// Every table and column must be named and typed.
    pub fn validate(&self) -> Result<()> {
        for table in &self.tables {
            if table.name.trim().is_empty() {
                return Err(SchemaError::Config("tables[].name is required".into()));
            }
            for column in &table.columns {
                if column.name.trim().is_empty() {
                    return Err(SchemaError::Config(format!(
                        "{}: columns[].name is required",
                        table.name
                    )));
                }
                if column.logical_type.is_none() && column.data_type.is_none() {
                    return Err(SchemaError::Config(format!(
                        "{}.{}: either type or data_type is required",
                        table.name, column.name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl ColumnModel {
    /// Resolve to a [`ColumnInfo`], mapping the logical type with `map_type`.
    pub fn to_column_info<F>(&self, map_type: F) -> Result<ColumnInfo>
    where
        F: Fn(LogicalType, i32, i32) -> Option<String>,
    {
        let data_type = match (&self.data_type, self.logical_type) {
            (Some(native), _) => native.clone(),
            (None, Some(logical)) => map_type(logical, self.max_length, self.min_length)
                .ok_or_else(|| SchemaError::UnmappableType {
                    column: self.name.clone(),
                    logical: logical.to_string(),
                })?,
            (None, None) => return Err(SchemaError::InvalidArgument("data_type")),
        };
        let (max_length, min_length) =
            declared_lengths(&data_type).unwrap_or((self.max_length, self.min_length));

        Ok(ColumnInfo {
            name: self.name.clone(),
            is_nullable: self.nullable.unwrap_or(!self.key),
            is_key: self.key,
            is_auto_increment: self.auto_increment,
            order: 0,
            max_length,
            min_length,
            data_type,
            indexes: self
                .indexes
                .iter()
                .map(|i| IndexInfo::new(i.name.clone(), self.name.clone(), i.unique))
                .collect(),
        })
    }
}

/// Lengths written into a native type, e.g. `NUMBER(12, 2)` → `(12, 2)`.
///
/// Returns `None` for types without a parenthesized length.
fn declared_lengths(data_type: &str) -> Option<(i32, i32)> {
    let open = data_type.find('(')?;
    let close = open + data_type[open..].find(')')?;
    let mut parts = data_type[open + 1..close].split(',').map(|p| p.trim().parse::<i32>());
    let max_length = parts.next()?.ok()?;
    let min_length = match parts.next() {
        Some(p) => p.ok()?,
        None => 0,
    };
    Some((max_length, min_length))
}
