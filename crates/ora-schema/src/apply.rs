//! Bring a database in line with a [`SchemaModel`].
//!
//! Missing tables are created, missing columns added and declared indexes
//! ensured. Existing columns are never altered; type differences are only
//! reported.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{SchemaModel, TableModel};
use crate::core::identifier::names_equal;
use crate::core::schema::{ColumnInfo, IndexInfo};
use crate::core::traits::SchemaProvider;
use crate::error::Result;

/// What [`apply_model`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Tables created.
    pub tables_created: Vec<String>,
    /// Columns added, as `table.column`.
    pub columns_added: Vec<String>,
    /// Tables on which at least one index was created.
    pub indexes_created: Vec<String>,
    /// Existing columns whose type differs from the model, as `table.column`.
    pub type_mismatches: Vec<String>,
}

impl ApplyReport {
    /// Whether anything was created.
    pub fn changed(&self) -> bool {
        !self.tables_created.is_empty()
            || !self.columns_added.is_empty()
            || !self.indexes_created.is_empty()
    }
}

fn resolve_columns<P: SchemaProvider + ?Sized>(
    provider: &P,
    table: &TableModel,
) -> Result<Vec<ColumnInfo>> {
    table
        .columns
        .iter()
        .map(|c| c.to_column_info(|logical, max, min| provider.get_column_type(logical, max, min)))
        .collect()
}

/// Apply every table of `model` through `provider`.
pub async fn apply_model<P: SchemaProvider + ?Sized>(
    provider: &P,
    model: &SchemaModel,
) -> Result<ApplyReport> {
    let mut report = ApplyReport::default();
    let existing_tables = provider.get_tables().await?;

    for table in &model.tables {
        let columns = resolve_columns(provider, table)?;

        if !existing_tables.iter().any(|t| names_equal(&t.name, &table.name)) {
            if provider.create_table(&table.name, &columns).await? {
                info!("Created table {}", table.name);
                report.tables_created.push(table.name.clone());
            }
            continue;
        }

        let existing_columns = provider.get_table_columns(&table.name).await?;
        let mut indexes: Vec<IndexInfo> = Vec::new();

        for column in &columns {
            match existing_columns
                .iter()
                .find(|c| names_equal(&c.name, &column.name))
            {
                Some(existing) => {
                    if !provider.columns_equal(existing, column) {
                        warn!(
                            "Column {}.{} is {} in the database but {} in the model",
                            table.name, column.name, existing.data_type, column.data_type
                        );
                        report
                            .type_mismatches
                            .push(format!("{}.{}", table.name, column.name));
                    }
                }
                None => {
                    if provider.add_column(&table.name, column).await? {
                        report
                            .columns_added
                            .push(format!("{}.{}", table.name, column.name));
                    }
                }
            }
            indexes.extend(column.indexes.iter().cloned());
        }

        if !indexes.is_empty() && provider.add_indexes(&table.name, &indexes).await? {
            report.indexes_created.push(table.name.clone());
        }
    }

    Ok(report)
}
