//! Pure translations between catalog records and column models.

use crate::autoincrement::is_auto_increment;
use crate::catalog::{IndexColumnRow, TabColumnRow, TriggerRow};
use crate::core::identifier::{contains_name, names_equal};
use crate::core::schema::{ColumnInfo, IndexInfo};

/// Catalog reads for one table, as consumed by [`fold_columns`].
#[derive(Debug, Clone, Default)]
pub struct TableCatalog {
    pub columns: Vec<TabColumnRow>,
    pub triggers: Vec<TriggerRow>,
    pub primary_key: Vec<String>,
    pub index_columns: Vec<IndexColumnRow>,
    pub sequences: Vec<String>,
}

/// Fold the catalog reads of `table` into one [`ColumnInfo`] per column.
///
/// Output order follows `catalog.columns`, which the catalog returns by
/// `COLUMN_ID`.
pub fn fold_columns(table: &str, catalog: &TableCatalog) -> Vec<ColumnInfo> {
    catalog
        .columns
        .iter()
        .map(|row| {
            let name = row.column_name.clone();
            let (max_length, min_length) = row.lengths();

            let indexes = catalog
                .index_columns
                .iter()
                .filter(|ic| names_equal(&ic.column_name, &name))
                .map(|ic| IndexInfo::new(ic.index_name.clone(), name.clone(), ic.is_unique()))
                .collect();

            ColumnInfo {
                is_nullable: row.is_nullable(),
                is_key: contains_name(&catalog.primary_key, &name),
                is_auto_increment: is_auto_increment(
                    table,
                    &name,
                    &catalog.triggers,
                    &catalog.sequences,
                ),
                order: row.column_id,
                max_length,
                min_length,
                data_type: row.data_type.clone(),
                indexes,
                name,
            }
        })
        .collect()
}

/// One index to create: name, uniqueness and ordered columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexGroup {
    pub name: String,
    pub is_unique: bool,
    pub columns: Vec<String>,
}

/// Group per-column index entries into whole indexes.
///
/// Entries missing a name or column are dropped. Names match
/// case-insensitively; a group keeps its first spelling and first-seen
/// position, is unique if any member is, and lists columns in input order.
pub fn group_indexes(indexes: &[IndexInfo]) -> Vec<IndexGroup> {
    let mut groups: Vec<IndexGroup> = Vec::new();

    for index in indexes.iter().filter(|i| i.is_complete()) {
        match groups.iter_mut().find(|g| names_equal(&g.name, &index.name)) {
            Some(group) => {
                group.is_unique |= index.is_unique;
                group.columns.push(index.column_name.clone());
            }
            None => groups.push(IndexGroup {
                name: index.name.clone(),
                is_unique: index.is_unique,
                columns: vec![index.column_name.clone()],
            }),
        }
    }

    groups
}

/// Base type name: the text before any `(`.
fn base_type(data_type: &str) -> &str {
    data_type.split('(').next().unwrap_or(data_type).trim()
}

fn is_any(base: &str, names: &[&str]) -> bool {
    names.iter().any(|n| names_equal(base, n))
}

/// Structural type equality of two column definitions.
///
/// Base type names must match. National character types must also agree
/// on length. Decimal types differ only when both precision and scale
/// differ.
pub fn columns_equal(a: &ColumnInfo, b: &ColumnInfo) -> bool {
    let base_a = base_type(&a.data_type);
    let base_b = base_type(&b.data_type);
    if !names_equal(base_a, base_b) {
        return false;
    }

    if is_any(base_a, &["NCHAR", "NVARCHAR", "NVARCHAR2"]) && a.max_length != b.max_length {
        return false;
    }

    if is_any(base_a, &["DECIMAL", "NUMBER"])
        && a.max_length != b.max_length
        && a.min_length != b.min_length
    {
        return false;
    }

    true
}
