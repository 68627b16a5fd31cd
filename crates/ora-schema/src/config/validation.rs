//! Configuration validation.

use super::Config;
use crate::error::{Result, SchemaError};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let conn = &config.connection;

    if conn.user.trim().is_empty() {
        return Err(SchemaError::Config("connection.user is required".into()));
    }
    if conn.connect_string.trim().is_empty() {
        return Err(SchemaError::Config(
            "connection.connect_string is required".into(),
        ));
    }
    if conn.user.contains('\0') || conn.connect_string.contains('\0') {
        return Err(SchemaError::Config(
            "connection settings must not contain null bytes".into(),
        ));
    }
    if let Some(0) = conn.stmt_cache_size {
        return Err(SchemaError::Config(
            "connection.stmt_cache_size must be at least 1 when set".into(),
        ));
    }

    Ok(())
}
