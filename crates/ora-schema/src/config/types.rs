//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Oracle connection settings.
    pub connection: ConnectionConfig,
}

/// Oracle connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Username. Also determines the schema owner (upper-cased).
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Easy Connect string or TNS alias (e.g., "//localhost:1521/FREEPDB1").
    pub connect_string: String,

    /// Statement cache size for the session (default: driver default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stmt_cache_size: Option<u32>,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("connect_string", &self.connect_string)
            .field("stmt_cache_size", &self.stmt_cache_size)
            .finish()
    }
}
