//! # ora-schema
//!
//! Oracle schema reflection and DDL synthesis.
//!
//! This library reads the Oracle data dictionary to reconstruct tables,
//! columns, keys, indexes and emulated auto-increment columns, and creates
//! whatever a logical model declares but the database lacks:
//!
//! - **Catalog reads** over `ALL_TABLES`, `ALL_TAB_COLUMNS`, `ALL_INDEXES`,
//!   `ALL_TRIGGERS`, `ALL_SEQUENCES` and friends
//! - **Type mapping** from logical column types to Oracle types
//! - **Auto-increment emulation** with a sequence and an insert trigger
//! - **Idempotent DDL**: every CREATE is preceded by an existence check
//!
//! ## Example
//!
//! ```rust,no_run
//! use ora_schema::{ColumnInfo, Config, OracleTableSchema, SchemaProvider};
//!
//! #[tokio::main]
//! async fn main() -> ora_schema::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let schema = OracleTableSchema::connect(&config.connection).await?;
//!
//!     let columns = vec![
//!         ColumnInfo::new("Id", "NUMBER(11, 0)").key().auto_increment(),
//!         ColumnInfo::new("Name", "NVARCHAR2(50)"),
//!     ];
//!     schema.create_table("Users", &columns).await?;
//!
//!     for column in schema.get_table_columns("Users").await? {
//!         println!("{} {}", column.name, column.data_type);
//!     }
//!     schema.close().await
//! }
//! ```

pub mod apply;
pub mod autoincrement;
pub mod catalog;
pub mod config;
pub mod core;
pub mod ddl;
pub mod drivers;
pub mod error;
pub mod schema;
pub mod typemap;

// Re-exports for convenient access
pub use apply::{apply_model, ApplyReport};
pub use config::{Config, ConnectionConfig, SchemaModel};
pub use self::core::{ColumnInfo, IndexInfo, QueryEngine, SchemaProvider, SqlLog, TableInfo};
pub use error::{Result, SchemaError};
pub use schema::OracleTableSchema;
pub use typemap::{HasLogicalType, LogicalType};

#[cfg(feature = "oracle")]
pub use drivers::OracleEngine;
