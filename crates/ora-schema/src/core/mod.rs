//! Core abstractions for schema reflection.
//!
//! - [`schema`]: Table, column, and index metadata types
//! - [`value`]: Catalog row and value representation
//! - [`traits`]: The query engine seam and the schema capability
//! - [`identifier`]: Quoting, validation, and name comparison
//!
//! Driver modules (`drivers/oracle`) implement [`QueryEngine`]; the schema
//! layer in [`crate::schema`] implements [`SchemaProvider`] on top of it.

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

// Re-export commonly used types for convenience
pub use schema::{ColumnInfo, IndexInfo, TableInfo};
pub use traits::{Params, QueryEngine, SchemaProvider, SqlLog};
pub use value::{FromRow, Row, SqlValue};
