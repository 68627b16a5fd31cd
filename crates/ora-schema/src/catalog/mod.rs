//! Read-only queries against the Oracle data dictionary.
//!
//! All queries bind the owner and table by name (`:owner`, `:table_name`);
//! an absent object yields an empty result, never an error.

pub mod rows;

use tracing::debug;

use crate::core::schema::TableInfo;
use crate::core::traits::QueryEngine;
use crate::core::value::{FromRow, Row};
use crate::error::Result;

pub use rows::{IndexColumnRow, TabColumnRow, TriggerRow};

pub const SQL_LIST_TABLES: &str = "SELECT TABLE_NAME FROM ALL_TABLES WHERE OWNER = :owner";

pub const SQL_LIST_COLUMNS: &str = "SELECT COLUMN_ID, COLUMN_NAME, DATA_TYPE, DATA_LENGTH, \
     CHAR_LENGTH, DATA_PRECISION, DATA_SCALE, NULLABLE FROM ALL_TAB_COLUMNS \
     WHERE OWNER = :owner AND TABLE_NAME = :table_name ORDER BY COLUMN_ID";

pub const SQL_LIST_PRIMARY_KEY_COLUMNS: &str = "SELECT a.COLUMN_NAME FROM ALL_CONS_COLUMNS a \
     INNER JOIN ALL_CONSTRAINTS b ON a.OWNER = b.OWNER AND a.CONSTRAINT_NAME = b.CONSTRAINT_NAME \
     AND a.TABLE_NAME = b.TABLE_NAME \
     WHERE b.OWNER = :owner AND b.TABLE_NAME = :table_name AND b.CONSTRAINT_TYPE = 'P' \
     ORDER BY a.POSITION";

pub const SQL_LIST_INDEX_COLUMNS: &str = "SELECT a.INDEX_NAME, a.COLUMN_NAME, b.UNIQUENESS \
     FROM ALL_IND_COLUMNS a INNER JOIN ALL_INDEXES b ON a.TABLE_OWNER = b.TABLE_OWNER \
     AND a.TABLE_NAME = b.TABLE_NAME AND a.INDEX_NAME = b.INDEX_NAME \
     WHERE a.TABLE_OWNER = :owner AND a.TABLE_NAME = :table_name \
     AND b.TABLE_TYPE = 'TABLE' AND b.GENERATED = 'N' \
     ORDER BY a.INDEX_NAME, a.COLUMN_POSITION";

pub const SQL_LIST_INSERT_TRIGGERS: &str = "SELECT TRIGGER_NAME, TRIGGER_BODY FROM ALL_TRIGGERS \
     WHERE OWNER = :owner AND TRIGGERING_EVENT = 'INSERT' AND TABLE_NAME = :table_name";

pub const SQL_LIST_SEQUENCES: &str =
    "SELECT SEQUENCE_NAME FROM ALL_SEQUENCES WHERE SEQUENCE_OWNER = :owner";

pub const SQL_INDEX_EXISTS: &str = "SELECT COUNT(1) FROM ALL_INDEXES \
     WHERE OWNER = :owner AND TABLE_NAME = :table_name AND TABLE_TYPE = 'TABLE' \
     AND INDEX_NAME = :index_name";

pub const SQL_TABLE_EXISTS: &str =
    "SELECT COUNT(1) FROM ALL_TABLES WHERE OWNER = :owner AND TABLE_NAME = :table_name";

pub const SQL_COLUMN_EXISTS: &str = "SELECT COUNT(1) FROM ALL_TAB_COLUMNS \
     WHERE OWNER = :owner AND TABLE_NAME = :table_name AND COLUMN_NAME = :column_name";

/// Catalog queries over a borrowed query engine.
pub struct CatalogReader<'a, E: QueryEngine + ?Sized> {
    engine: &'a E,
}

impl<'a, E: QueryEngine + ?Sized> CatalogReader<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    async fn fetch<T: FromRow>(&self, sql: &str, params: &[(&str, &str)]) -> Result<Vec<T>> {
        let rows: Vec<Row> = self.engine.query(sql, params).await?;
        rows.iter().map(T::from_row).collect()
    }

    async fn count(&self, sql: &str, params: &[(&str, &str)]) -> Result<i64> {
        let value = self.engine.execute_scalar(sql, params).await?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    /// Tables owned by `owner`, in catalog order.
    pub async fn list_tables(&self, owner: &str) -> Result<Vec<TableInfo>> {
        let tables: Vec<TableInfo> = self.fetch(SQL_LIST_TABLES, &[("owner", owner)]).await?;
        debug!("Listed {} tables for owner {}", tables.len(), owner);
        Ok(tables)
    }

    /// Columns of `table`, ordered by `COLUMN_ID`.
    pub async fn list_columns(&self, owner: &str, table: &str) -> Result<Vec<TabColumnRow>> {
        let columns: Vec<TabColumnRow> = self
            .fetch(SQL_LIST_COLUMNS, &[("owner", owner), ("table_name", table)])
            .await?;
        debug!("Loaded {} columns for {}.{}", columns.len(), owner, table);
        Ok(columns)
    }

    /// Names of the primary key columns of `table`.
    pub async fn list_primary_key_columns(&self, owner: &str, table: &str) -> Result<Vec<String>> {
        let keys: Vec<String> = self
            .fetch(
                SQL_LIST_PRIMARY_KEY_COLUMNS,
                &[("owner", owner), ("table_name", table)],
            )
            .await?;
        debug!("Loaded {} primary key columns for {}.{}", keys.len(), owner, table);
        Ok(keys)
    }

    /// User-defined index memberships of `table`, ordered by index then position.
    pub async fn list_index_columns(
        &self,
        owner: &str,
        table: &str,
    ) -> Result<Vec<IndexColumnRow>> {
        let indexes: Vec<IndexColumnRow> = self
            .fetch(SQL_LIST_INDEX_COLUMNS, &[("owner", owner), ("table_name", table)])
            .await?;
        debug!("Loaded {} index columns for {}.{}", indexes.len(), owner, table);
        Ok(indexes)
    }

    /// INSERT triggers defined on `table`.
    pub async fn list_auto_increment_triggers(
        &self,
        owner: &str,
        table: &str,
    ) -> Result<Vec<TriggerRow>> {
        let triggers: Vec<TriggerRow> = self
            .fetch(SQL_LIST_INSERT_TRIGGERS, &[("owner", owner), ("table_name", table)])
            .await?;
        debug!("Loaded {} insert triggers for {}.{}", triggers.len(), owner, table);
        Ok(triggers)
    }

    /// Every sequence owned by `owner`.
    pub async fn list_sequences(&self, owner: &str) -> Result<Vec<String>> {
        let sequences: Vec<String> = self.fetch(SQL_LIST_SEQUENCES, &[("owner", owner)]).await?;
        debug!("Listed {} sequences for owner {}", sequences.len(), owner);
        Ok(sequences)
    }

    pub async fn index_exists(&self, owner: &str, table: &str, index: &str) -> Result<bool> {
        let count = self
            .count(
                SQL_INDEX_EXISTS,
                &[("owner", owner), ("table_name", table), ("index_name", index)],
            )
            .await?;
        Ok(count > 0)
    }

    pub async fn table_exists(&self, owner: &str, table: &str) -> Result<bool> {
        let count = self
            .count(SQL_TABLE_EXISTS, &[("owner", owner), ("table_name", table)])
            .await?;
        Ok(count > 0)
    }

    pub async fn column_exists(&self, owner: &str, table: &str, column: &str) -> Result<bool> {
        let count = self
            .count(
                SQL_COLUMN_EXISTS,
                &[("owner", owner), ("table_name", table), ("column_name", column)],
            )
            .await?;
        Ok(count > 0)
    }
}
