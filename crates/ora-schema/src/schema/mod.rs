//! Oracle implementation of [`SchemaProvider`].
//!
//! Every write follows the same shape: check the catalog, build DDL only for
//! what is missing, execute. Multi-step writes run inside one transaction
//! scope. Oracle commits implicitly around each DDL statement, so each step
//! that creates an object also records the statement that removes it; on
//! failure those run in reverse before the rollback.

pub mod fold;

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::autoincrement::{self, sequence_name, AutoIncrementApplied};
use crate::catalog::CatalogReader;
use crate::core::identifier::{fold_owner, names_equal, validate_identifier};
use crate::core::schema::{ColumnInfo, IndexInfo, TableInfo};
use crate::core::traits::{QueryEngine, SchemaProvider, SqlLog};
use crate::ddl;
use crate::error::{Result, SchemaError};
use crate::typemap::{self, LogicalType};

pub use fold::{columns_equal, fold_columns, group_indexes, IndexGroup, TableCatalog};

/// Statements that undo what a failed multi-step write already created.
#[derive(Debug, Default)]
struct UndoLog {
    statements: Vec<String>,
}

impl UndoLog {
    fn push(&mut self, sql: String) {
        self.statements.push(sql);
    }
}

/// Schema reflection and DDL for the objects owned by one Oracle user.
pub struct OracleTableSchema<E: QueryEngine> {
    engine: E,
    owner: String,
    closed: AtomicBool,
}

impl<E: QueryEngine> OracleTableSchema<E> {
    /// Wrap an engine connected as `user`.
    ///
    /// The owner is `user` folded to upper case, the way Oracle stores
    /// unquoted names.
    pub fn new(engine: E, user: &str) -> Self {
        let owner = fold_owner(user);
        debug!("Schema owner resolved to {}", owner);
        Self {
            engine,
            owner,
            closed: AtomicBool::new(false),
        }
    }

    /// Catalog owner all reads are filtered by.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(SchemaError::Closed);
        }
        Ok(())
    }

    fn catalog(&self) -> CatalogReader<'_, E> {
        CatalogReader::new(&self.engine)
    }

    /// Read everything [`fold_columns`] needs for `table`.
    pub async fn read_table_catalog(&self, table: &str) -> Result<TableCatalog> {
        let catalog = self.catalog();
        Ok(TableCatalog {
            columns: catalog.list_columns(&self.owner, table).await?,
            triggers: catalog
                .list_auto_increment_triggers(&self.owner, table)
                .await?,
            primary_key: catalog
                .list_primary_key_columns(&self.owner, table)
                .await?,
            index_columns: catalog.list_index_columns(&self.owner, table).await?,
            sequences: catalog.list_sequences(&self.owner).await?,
        })
    }

    /// Commit on success; otherwise undo and roll back, keeping the
    /// original error.
    async fn finish<T>(&self, result: Result<T>, undo: UndoLog, operation: &str) -> Result<T> {
        let result = match result {
            Ok(value) => self.engine.commit().await.map(|()| value),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!("{} failed, rolling back: {}", operation, e);
            self.compensate(undo).await;
            if let Err(rollback_err) = self.engine.rollback().await {
                warn!("Rollback after failed {} also failed: {}", operation, rollback_err);
            }
        }
        result
    }

    async fn compensate(&self, undo: UndoLog) {
        for sql in undo.statements.iter().rev() {
            match self.engine.execute_non_query(sql).await {
                Ok(_) => debug!("Compensated: {}", sql),
                Err(e) => warn!("Compensating statement failed: {}: {}", sql, e),
            }
        }
    }

    async fn create_table_steps(
        &self,
        table: &str,
        columns: &[ColumnInfo],
        groups: &[IndexGroup],
        create_sql: &str,
        undo: &mut UndoLog,
    ) -> Result<bool> {
        let mut count = self.engine.execute_non_query(create_sql).await?;
        undo.push(ddl::build_drop_table(table));
        info!("Created table {} with {} columns", table, columns.len());

        for column in columns.iter().filter(|c| c.is_auto_increment) {
            count += self.apply_auto_increment(table, &column.name, undo).await?;
        }

        if !groups.is_empty() && self.create_index_groups(table, groups).await? {
            count += 1;
        }

        Ok(count != 0)
    }

    async fn add_column_steps(
        &self,
        table: &str,
        column: &ColumnInfo,
        undo: &mut UndoLog,
    ) -> Result<bool> {
        let mut count = 0u64;

        if self
            .catalog()
            .column_exists(&self.owner, table, &column.name)
            .await?
        {
            debug!("Column {}.{} already exists", table, column.name);
        } else {
            count += self
                .engine
                .execute_non_query(&ddl::build_add_column(table, column))
                .await?;
            undo.push(ddl::build_drop_column(table, &column.name));
            info!("Added column {}.{}", table, column.name);
        }

        if column.is_auto_increment {
            count += self.apply_auto_increment(table, &column.name, undo).await?;
        }

        Ok(count != 0)
    }

    async fn alter_column_steps(
        &self,
        table: &str,
        current: &ColumnInfo,
        column: &ColumnInfo,
        undo: &mut UndoLog,
    ) -> Result<bool> {
        let nullability = (current.is_nullable != column.is_nullable).then_some(column.is_nullable);
        let mut count = self
            .engine
            .execute_non_query(&ddl::build_modify_column(table, column, nullability))
            .await?;
        let previous = ColumnInfo {
            data_type: ddl::catalog_type(current),
            ..current.clone()
        };
        undo.push(ddl::build_modify_column(
            table,
            &previous,
            nullability.map(|_| current.is_nullable),
        ));
        info!("Modified column {}.{} to {}", table, column.name, column.data_type);

        if column.is_auto_increment && !current.is_auto_increment {
            count += self.apply_auto_increment(table, &column.name, undo).await?;
        }

        Ok(count != 0)
    }

    /// The column goes first; Oracle drops the indexes on it with it.
    /// Remaining indexes and the auto-increment pair follow.
    async fn delete_column_steps(
        &self,
        table: &str,
        column: &ColumnInfo,
        current: &ColumnInfo,
    ) -> Result<bool> {
        let mut count = self
            .engine
            .execute_non_query(&ddl::build_drop_column(table, &column.name))
            .await?;
        info!("Dropped column {}.{}", table, column.name);

        let mut index_names: Vec<&str> = Vec::new();
        for index in column.indexes.iter().chain(current.indexes.iter()) {
            if !index.name.is_empty() && !index_names.iter().any(|n| names_equal(n, &index.name)) {
                index_names.push(&index.name);
            }
        }
        for index in index_names {
            if self.drop_index_if_exists(table, index).await? {
                count += 1;
            }
        }

        count += autoincrement::drop_auto_increment(&self.engine, &self.owner, table, &column.name)
            .await? as u64;

        Ok(count != 0)
    }

    /// Ensure the sequence + trigger pair, recording undo for what was created.
    async fn apply_auto_increment(
        &self,
        table: &str,
        column: &str,
        undo: &mut UndoLog,
    ) -> Result<u64> {
        let mut applied = AutoIncrementApplied::default();
        let result = autoincrement::ensure_auto_increment_into(
            &self.engine,
            &self.owner,
            table,
            column,
            &mut applied,
        )
        .await;
        if let Some(sequence) = &applied.sequence {
            undo.push(ddl::build_drop_sequence(sequence));
        }
        if let Some(trigger) = &applied.trigger {
            undo.push(ddl::build_drop_trigger(trigger));
        }
        result.map(|()| applied.count() as u64)
    }

    async fn create_index_groups(&self, table: &str, groups: &[IndexGroup]) -> Result<bool> {
        let mut created = false;
        for group in groups {
            if self
                .create_index(table, &group.name, group.is_unique, &group.columns)
                .await?
            {
                created = true;
            }
        }
        Ok(created)
    }

    async fn create_index(
        &self,
        table: &str,
        index_name: &str,
        is_unique: bool,
        columns: &[String],
    ) -> Result<bool> {
        if self
            .catalog()
            .index_exists(&self.owner, table, index_name)
            .await?
        {
            debug!("Index {} on {} already exists", index_name, table);
            return Ok(false);
        }

        let Some(sql) = ddl::build_create_index(table, index_name, is_unique, columns) else {
            return Ok(false);
        };
        let count = self.engine.execute_non_query(&sql).await?;
        info!(
            "Created {}index {} on {} ({})",
            if is_unique { "unique " } else { "" },
            index_name,
            table,
            columns.join(", ")
        );
        Ok(count > 0)
    }

    async fn drop_index_if_exists(&self, table: &str, index_name: &str) -> Result<bool> {
        if !self
            .catalog()
            .index_exists(&self.owner, table, index_name)
            .await?
        {
            debug!("Index {} on {} does not exist", index_name, table);
            return Ok(false);
        }

        let count = self
            .engine
            .execute_non_query(&ddl::build_drop_index(index_name))
            .await?;
        info!("Dropped index {} on {}", index_name, table);
        Ok(count > 0)
    }
}

#[cfg(feature = "oracle")]
impl OracleTableSchema<crate::drivers::oracle::OracleEngine> {
    /// Connect with the given settings and resolve the owner from its user.
    pub async fn connect(config: &crate::config::ConnectionConfig) -> Result<Self> {
        let engine = crate::drivers::oracle::OracleEngine::connect(config).await?;
        Ok(Self::new(engine, &config.user))
    }
}

/// Per-column index declarations, with blank column names filled in from
/// the declaring column.
fn declared_indexes(columns: &[ColumnInfo]) -> Vec<IndexInfo> {
    columns
        .iter()
        .flat_map(|c| {
            c.indexes.iter().map(move |i| {
                let mut index = i.clone();
                if index.column_name.is_empty() {
                    index.column_name = c.name.clone();
                }
                index
            })
        })
        .collect()
}

/// Group index entries, rejecting bad names before any statement runs.
fn validated_groups(indexes: &[IndexInfo]) -> Result<Vec<IndexGroup>> {
    let groups = group_indexes(indexes);
    for group in &groups {
        validate_identifier("index_name", &group.name)?;
        for column in &group.columns {
            validate_identifier("column", column)?;
        }
    }
    Ok(groups)
}

fn validate_column(column: &ColumnInfo) -> Result<()> {
    validate_identifier("column", &column.name)?;
    if column.data_type.trim().is_empty() {
        return Err(SchemaError::InvalidArgument("data_type"));
    }
    Ok(())
}

#[async_trait]
impl<E: QueryEngine> SchemaProvider for OracleTableSchema<E> {
    async fn get_tables(&self) -> Result<Vec<TableInfo>> {
        self.ensure_open()?;
        self.catalog().list_tables(&self.owner).await
    }

    async fn get_table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        self.ensure_open()?;
        validate_identifier("table", table)?;
        let catalog = self.read_table_catalog(table).await?;
        Ok(fold_columns(table, &catalog))
    }

    async fn create_table(&self, table: &str, columns: &[ColumnInfo]) -> Result<bool> {
        self.ensure_open()?;
        validate_identifier("table", table)?;
        if columns.is_empty() {
            return Ok(false);
        }
        for column in columns {
            validate_column(column)?;
        }
        let groups = validated_groups(&declared_indexes(columns))?;

        if self.catalog().table_exists(&self.owner, table).await? {
            debug!("Table {} already exists", table);
            return Ok(false);
        }

        let Some(sql) = ddl::build_create_table(table, columns) else {
            return Ok(false);
        };

        self.engine.begin_transaction().await?;
        let mut undo = UndoLog::default();
        let result = self
            .create_table_steps(table, columns, &groups, &sql, &mut undo)
            .await;
        self.finish(result, undo, "create table").await
    }

    async fn add_column(&self, table: &str, column: &ColumnInfo) -> Result<bool> {
        self.ensure_open()?;
        validate_identifier("table", table)?;
        validate_column(column)?;

        self.engine.begin_transaction().await?;
        let mut undo = UndoLog::default();
        let result = self.add_column_steps(table, column, &mut undo).await;
        self.finish(result, undo, "add column").await
    }

    async fn add_indexes(&self, table: &str, indexes: &[IndexInfo]) -> Result<bool> {
        self.ensure_open()?;
        validate_identifier("table", table)?;
        let groups = validated_groups(indexes)?;
        self.create_index_groups(table, &groups).await
    }

    async fn add_index(
        &self,
        table: &str,
        index_name: &str,
        is_unique: bool,
        columns: &[String],
    ) -> Result<bool> {
        self.ensure_open()?;
        validate_identifier("table", table)?;
        if columns.is_empty() {
            return Ok(false);
        }
        validate_identifier("index_name", index_name)?;
        for column in columns {
            validate_identifier("column", column)?;
        }
        self.create_index(table, index_name, is_unique, columns).await
    }

    async fn add_index_model(&self, table: &str, index: &IndexInfo) -> Result<bool> {
        self.ensure_open()?;
        validate_identifier("table", table)?;
        if !index.is_complete() {
            return Ok(false);
        }
        self.add_index(
            table,
            &index.name,
            index.is_unique,
            std::slice::from_ref(&index.column_name),
        )
        .await
    }

    async fn delete_index(&self, table: &str, index_name: &str) -> Result<bool> {
        self.ensure_open()?;
        validate_identifier("table", table)?;
        if index_name.is_empty() {
            return Ok(false);
        }
        validate_identifier("index_name", index_name)?;
        self.drop_index_if_exists(table, index_name).await
    }

    fn get_column_type(
        &self,
        logical: LogicalType,
        max_length: i32,
        min_length: i32,
    ) -> Option<String> {
        let native = typemap::column_type(logical, max_length, min_length);
        if native.is_none() {
            warn!("No Oracle type for {} ({}, {})", logical, max_length, min_length);
        }
        native
    }

    async fn delete_table(&self, table: &str) -> Result<bool> {
        self.ensure_open()?;
        validate_identifier("table", table)?;

        if !self.catalog().table_exists(&self.owner, table).await? {
            debug!("Table {} does not exist", table);
            return Ok(false);
        }

        let columns = self.get_table_columns(table).await?;
        let count = self
            .engine
            .execute_non_query(&ddl::build_drop_table(table))
            .await?;
        info!("Dropped table {}", table);

        let sequences = self.catalog().list_sequences(&self.owner).await?;
        for column in columns.iter().filter(|c| c.is_auto_increment) {
            let sequence = sequence_name(table, &column.name);
            if let Some(existing) = sequences.iter().find(|s| names_equal(s, &sequence)) {
                self.engine
                    .execute_non_query(&ddl::build_drop_sequence(existing))
                    .await?;
                info!("Dropped sequence {}", existing);
            }
        }

        Ok(count != 0)
    }

    async fn delete_column(&self, table: &str, column: &ColumnInfo) -> Result<bool> {
        self.ensure_open()?;
        validate_identifier("table", table)?;
        validate_identifier("column", &column.name)?;

        let current_columns = self.get_table_columns(table).await?;
        let Some(current) = current_columns
            .iter()
            .find(|c| names_equal(&c.name, &column.name))
        else {
            debug!("Column {}.{} does not exist", table, column.name);
            return Ok(false);
        };

        self.engine.begin_transaction().await?;
        let result = self.delete_column_steps(table, column, current).await;
        self.finish(result, UndoLog::default(), "delete column").await
    }

    async fn alter_column(&self, table: &str, column: &ColumnInfo) -> Result<bool> {
        self.ensure_open()?;
        validate_identifier("table", table)?;
        validate_column(column)?;

        let current_columns = self.get_table_columns(table).await?;
        let Some(current) = current_columns
            .iter()
            .find(|c| names_equal(&c.name, &column.name))
        else {
            debug!("Column {}.{} does not exist", table, column.name);
            return Ok(false);
        };

        self.engine.begin_transaction().await?;
        let mut undo = UndoLog::default();
        let result = self.alter_column_steps(table, current, column, &mut undo).await;
        self.finish(result, undo, "alter column").await
    }

    fn columns_equal(&self, a: &ColumnInfo, b: &ColumnInfo) -> bool {
        columns_equal(a, b)
    }

    fn set_log(&self, log: Option<SqlLog>) {
        self.engine.set_log(log);
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        info!("Closing schema connection for {}", self.owner);
        self.engine.close().await
    }
}
