//! Error types for schema reflection and DDL operations.

use thiserror::Error;

/// ORA-00955: name is already used by an existing object.
const ORA_NAME_IN_USE: i32 = 955;
/// ORA-01408: such column list already indexed.
const ORA_COLUMN_LIST_INDEXED: i32 = 1408;
/// ORA-01430: column being added already exists in table.
const ORA_COLUMN_EXISTS: i32 = 1430;
/// ORA-04081: trigger already exists.
const ORA_TRIGGER_EXISTS: i32 = 4081;

/// Process exit codes used by the CLI.
pub const EXIT_CONFIG_ERROR: u8 = 1;
pub const EXIT_INVALID_ARGUMENT: u8 = 2;
pub const EXIT_EXECUTION_ERROR: u8 = 3;
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for schema operations.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A required identifier or collection was missing or empty.
    #[error("Invalid argument: {0} is required")]
    InvalidArgument(&'static str),

    /// An identifier failed validation (null byte, excessive length).
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Statement or query failed inside the query engine.
    #[error("Execution failed: {message}")]
    Execution { code: Option<i32>, message: String },

    /// A catalog row did not have the expected shape.
    #[error("Unexpected catalog row: {0}")]
    Row(String),

    /// A logical column type has no native mapping.
    #[error("Column {column}: type {logical} has no Oracle mapping")]
    UnmappableType { column: String, logical: String },

    /// The schema handle has already released its connection.
    #[error("Schema connection is closed")]
    Closed,

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Create an Execution error with an optional ORA- code.
    pub fn execution(code: Option<i32>, message: impl Into<String>) -> Self {
        SchemaError::Execution {
            code,
            message: message.into(),
        }
    }

    /// Create a Row error.
    pub fn row(message: impl Into<String>) -> Self {
        SchemaError::Row(message.into())
    }

    /// The ORA- error number, when the failure came from the database.
    pub fn ora_code(&self) -> Option<i32> {
        match self {
            SchemaError::Execution { code, .. } => *code,
            _ => None,
        }
    }

    /// Whether the failure means the object being created is already there.
    ///
    /// Existence checks run before every CREATE, but a concurrent caller can
    /// win the race in between. Layers that retry should treat this as
    /// "already satisfied".
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self.ora_code(),
            Some(ORA_NAME_IN_USE | ORA_COLUMN_LIST_INDEXED | ORA_COLUMN_EXISTS | ORA_TRIGGER_EXISTS)
        )
    }

    /// Exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            SchemaError::Config(_) | SchemaError::Yaml(_) | SchemaError::UnmappableType { .. } => {
                EXIT_CONFIG_ERROR
            }
            SchemaError::InvalidArgument(_) | SchemaError::InvalidIdentifier(_) => {
                EXIT_INVALID_ARGUMENT
            }
            SchemaError::Io(_) => EXIT_IO_ERROR,
            SchemaError::Execution { .. }
            | SchemaError::Row(_)
            | SchemaError::Closed
            | SchemaError::Json(_) => EXIT_EXECUTION_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

#[cfg(feature = "oracle")]
impl From<oracle::Error> for SchemaError {
    fn from(err: oracle::Error) -> Self {
        let code = err.db_error().map(|db| db.code());
        SchemaError::Execution {
            code,
            message: err.to_string(),
        }
    }
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
