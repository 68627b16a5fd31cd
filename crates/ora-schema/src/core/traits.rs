//! Core traits for Oracle schema reflection and DDL.
//!
//! - [`QueryEngine`]: the statement runner the schema layer is built on
//! - [`SchemaProvider`]: the schema capability exposed to callers
//!
//! Everything above the query engine talks to the database only through
//! [`QueryEngine`], which keeps the schema layer testable against an
//! in-memory catalog.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::typemap::LogicalType;

use super::schema::{ColumnInfo, IndexInfo, TableInfo};
use super::value::{Row, SqlValue};

/// Callback invoked with every SQL text before it is executed.
pub type SqlLog = Arc<dyn Fn(&str) + Send + Sync>;

/// Named bind parameters: `(":name" without the colon, value)`.
pub type Params<'a> = &'a [(&'a str, &'a str)];

/// Runs SQL against a single database session.
///
/// Calls are awaited one at a time; implementations need not support
/// concurrent use of the same session.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Run a query and collect every row.
    async fn query(&self, sql: &str, params: Params<'_>) -> Result<Vec<Row>>;

    /// Run a query and return the first column of the first row.
    ///
    /// Returns `None` when the query yields no rows.
    async fn execute_scalar(&self, sql: &str, params: Params<'_>) -> Result<Option<SqlValue>> {
        let rows = self.query(sql, params).await?;
        match rows.into_iter().next() {
            Some(row) if !row.is_empty() => Ok(Some(row.value(0)?.clone())),
            _ => Ok(None),
        }
    }

    /// Execute a statement and return the number of affected rows.
    ///
    /// DDL reports 1 once executed.
    async fn execute_non_query(&self, sql: &str) -> Result<u64>;

    /// Open a transaction scope.
    async fn begin_transaction(&self) -> Result<()>;

    /// Commit the open transaction scope.
    async fn commit(&self) -> Result<()>;

    /// Roll back the open transaction scope.
    async fn rollback(&self) -> Result<()>;

    /// Install or clear the SQL log callback.
    fn set_log(&self, log: Option<SqlLog>);

    /// Release the session.
    async fn close(&self) -> Result<()>;
}

/// Schema reflection and DDL capability for one database owner.
///
/// Write operations return `Ok(true)` when at least one statement took
/// effect and `Ok(false)` when the request was a no-op (nothing to do or
/// the object already exists).
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// List every table owned by the connected user.
    async fn get_tables(&self) -> Result<Vec<TableInfo>>;

    /// Reconstruct a table's columns, keys, auto-increment flags and indexes.
    ///
    /// Columns come back in catalog order; an unknown table yields an empty
    /// list.
    async fn get_table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Create a table with its primary key, auto-increment columns and
    /// declared indexes as one unit.
    async fn create_table(&self, table: &str, columns: &[ColumnInfo]) -> Result<bool>;

    /// Add a column (and its auto-increment pair) as one unit.
    async fn add_column(&self, table: &str, column: &ColumnInfo) -> Result<bool>;

    /// Create every complete index entry, grouped by index name.
    async fn add_indexes(&self, table: &str, indexes: &[IndexInfo]) -> Result<bool>;

    /// Create an index over `columns` unless one with that name exists.
    async fn add_index(
        &self,
        table: &str,
        index_name: &str,
        is_unique: bool,
        columns: &[String],
    ) -> Result<bool>;

    /// Create a single-column index from its model.
    async fn add_index_model(&self, table: &str, index: &IndexInfo) -> Result<bool>;

    /// Drop an index if it exists.
    async fn delete_index(&self, table: &str, index_name: &str) -> Result<bool>;

    /// Native type for a logical type. Pure; never touches the database.
    fn get_column_type(
        &self,
        logical: LogicalType,
        max_length: i32,
        min_length: i32,
    ) -> Option<String>;

    /// Drop a table and the auto-increment sequences of its columns.
    async fn delete_table(&self, table: &str) -> Result<bool>;

    /// Drop a column with its indexes and auto-increment pair.
    async fn delete_column(&self, table: &str, column: &ColumnInfo) -> Result<bool>;

    /// Change a column's type and nullability.
    async fn alter_column(&self, table: &str, column: &ColumnInfo) -> Result<bool>;

    /// Whether two column definitions describe the same physical type.
    fn columns_equal(&self, a: &ColumnInfo, b: &ColumnInfo) -> bool;

    /// Install or clear the SQL log callback.
    fn set_log(&self, log: Option<SqlLog>);

    /// Release the underlying session. Safe to call more than once.
    async fn close(&self) -> Result<()>;
}
