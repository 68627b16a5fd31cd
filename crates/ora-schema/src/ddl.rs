//! DDL statement builders.
//!
//! Pure functions: no I/O, no catalog lookups. Every identifier goes through
//! [`quote_ident`]. Builders that need at least one column return `None`
//! when given none.

use crate::core::identifier::quote_ident;
use crate::core::schema::ColumnInfo;

/// Largest value a NUMBER(28) sequence can reach.
const SEQUENCE_MAX_VALUE: &str = "9999999999999999999999999999";

/// Primary key constraint name for a table.
pub fn primary_key_name(table: &str) -> String {
    format!("PK_{}", table)
}

fn null_clause(is_nullable: bool) -> &'static str {
    if is_nullable {
        "NULL"
    } else {
        "NOT NULL"
    }
}

/// `"name" TYPE [NOT] NULL`
pub fn column_definition(column: &ColumnInfo) -> String {
    format!(
        "{} {} {}",
        quote_ident(&column.name),
        column.data_type,
        null_clause(column.is_nullable)
    )
}

fn quoted_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| quote_ident(n.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `CREATE TABLE` with an inline primary key over the key-flagged columns.
pub fn build_create_table(table: &str, columns: &[ColumnInfo]) -> Option<String> {
    if columns.is_empty() {
        return None;
    }

    let mut defs: Vec<String> = columns.iter().map(column_definition).collect();

    let keys: Vec<&str> = columns
        .iter()
        .filter(|c| c.is_key)
        .map(|c| c.name.as_str())
        .collect();
    if !keys.is_empty() {
        defs.push(format!(
            "CONSTRAINT {} PRIMARY KEY ({})",
            quote_ident(&primary_key_name(table)),
            quoted_list(&keys)
        ));
    }

    Some(format!(
        "CREATE TABLE {}({})",
        quote_ident(table),
        defs.join(", ")
    ))
}

pub fn build_add_column(table: &str, column: &ColumnInfo) -> String {
    format!(
        "ALTER TABLE {} ADD ({})",
        quote_ident(table),
        column_definition(column)
    )
}

/// `MODIFY` a column's type; the nullability clause is included only when
/// `nullability` is given, since Oracle rejects restating the current one.
pub fn build_modify_column(table: &str, column: &ColumnInfo, nullability: Option<bool>) -> String {
    let mut clause = format!("{} {}", quote_ident(&column.name), column.data_type);
    if let Some(is_nullable) = nullability {
        clause.push(' ');
        clause.push_str(null_clause(is_nullable));
    }
    format!("ALTER TABLE {} MODIFY ({})", quote_ident(table), clause)
}

/// Full type text for a column read back from the catalog, which reports
/// the base name and its lengths separately.
///
/// Types that already carry parameters (`TIMESTAMP(6)`) or take none
/// (`BLOB`, `DATE`) are returned unchanged.
pub fn catalog_type(column: &ColumnInfo) -> String {
    let base = column.data_type.trim();
    if base.contains('(') {
        return base.to_string();
    }
    match base.to_ascii_uppercase().as_str() {
        "NUMBER" | "DECIMAL" if column.max_length > 0 => {
            format!("{}({}, {})", base, column.max_length, column.min_length)
        }
        "CHAR" | "NCHAR" | "VARCHAR2" | "NVARCHAR2" | "RAW" if column.max_length > 0 => {
            format!("{}({})", base, column.max_length)
        }
        _ => base.to_string(),
    }
}

pub fn build_drop_column(table: &str, column: &str) -> String {
    format!(
        "ALTER TABLE {} DROP COLUMN {}",
        quote_ident(table),
        quote_ident(column)
    )
}

pub fn build_drop_table(table: &str) -> String {
    format!("DROP TABLE {} CASCADE CONSTRAINTS", quote_ident(table))
}

pub fn build_create_index<S: AsRef<str>>(
    table: &str,
    index: &str,
    is_unique: bool,
    columns: &[S],
) -> Option<String> {
    if columns.is_empty() {
        return None;
    }

    let unique = if is_unique { "UNIQUE " } else { "" };
    Some(format!(
        "CREATE {}INDEX {} ON {} ({})",
        unique,
        quote_ident(index),
        quote_ident(table),
        quoted_list(columns)
    ))
}

pub fn build_drop_index(index: &str) -> String {
    format!("DROP INDEX {}", quote_ident(index))
}

/// Sequence backing an auto-increment column: starts at 1, no cache.
pub fn build_create_sequence(sequence: &str) -> String {
    format!(
        "CREATE SEQUENCE {} MINVALUE 1 MAXVALUE {} START WITH 1 INCREMENT BY 1 NOCACHE",
        quote_ident(sequence),
        SEQUENCE_MAX_VALUE
    )
}

pub fn build_drop_sequence(sequence: &str) -> String {
    format!("DROP SEQUENCE {}", quote_ident(sequence))
}

/// Row-level BEFORE INSERT trigger assigning `sequence.NEXTVAL` to `column`.
pub fn build_create_trigger(trigger: &str, table: &str, sequence: &str, column: &str) -> String {
    format!(
        "CREATE TRIGGER {} BEFORE INSERT ON {} FOR EACH ROW BEGIN SELECT {}.NEXTVAL INTO :NEW.{} FROM DUAL; END;",
        quote_ident(trigger),
        quote_ident(table),
        quote_ident(sequence),
        quote_ident(column)
    )
}

pub fn build_drop_trigger(trigger: &str) -> String {
    format!("DROP TRIGGER {}", quote_ident(trigger))
}
