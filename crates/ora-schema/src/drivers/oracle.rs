//! [`QueryEngine`] over the `oracle` crate (ODPI-C).
//!
//! The driver is blocking, so every call runs on tokio's blocking pool
//! while holding the session mutex. One session serves one caller at a
//! time.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use oracle::sql_type::ToSql;
use oracle::{Connection, Connector};
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::core::traits::{Params, QueryEngine, SqlLog};
use crate::core::value::{Row, SqlValue};
use crate::error::{Result, SchemaError};

/// Statement kinds Oracle commits implicitly and reports no row count for.
const DDL_KEYWORDS: [&str; 3] = ["CREATE", "ALTER", "DROP"];

fn is_ddl(sql: &str) -> bool {
    let keyword = sql
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("");
    DDL_KEYWORDS.iter().any(|k| keyword.eq_ignore_ascii_case(k))
}

/// A single Oracle session.
pub struct OracleEngine {
    conn: Arc<Mutex<Option<Connection>>>,
    log: Mutex<Option<SqlLog>>,
}

impl OracleEngine {
    /// Open a session.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let config = config.clone();
        let conn = tokio::task::spawn_blocking(move || {
            let mut connector =
                Connector::new(&config.user, &config.password, &config.connect_string);
            if let Some(size) = config.stmt_cache_size {
                connector.stmt_cache_size(size);
            }
            connector.connect()
        })
        .await
        .map_err(join_error)??;

        info!("Connected to Oracle");
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already open session.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            log: Mutex::new(None),
        }
    }

    fn log_sql(&self, sql: &str) {
        debug!("SQL: {}", sql);
        let log = match self.log.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(log) = log {
            log(sql);
        }
    }

    /// Run `f` against the open session on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| SchemaError::execution(None, "Oracle session mutex poisoned"))?;
            match guard.as_ref() {
                Some(conn) => f(conn),
                None => Err(SchemaError::Closed),
            }
        })
        .await
        .map_err(join_error)?
    }
}

fn join_error(e: tokio::task::JoinError) -> SchemaError {
    SchemaError::execution(None, format!("blocking Oracle call failed: {}", e))
}

#[async_trait]
impl QueryEngine for OracleEngine {
    async fn query(&self, sql: &str, params: Params<'_>) -> Result<Vec<Row>> {
        self.log_sql(sql);
        let sql = sql.to_string();
        let params: Vec<(String, String)> = params
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        self.with_conn(move |conn| {
            let binds: Vec<(&str, &dyn ToSql)> = params
                .iter()
                .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
                .collect();
            let result_set = conn.query_named(&sql, &binds)?;

            let mut rows = Vec::new();
            for row in result_set {
                let row = row?;
                let width = row.sql_values().len();
                let mut values = Vec::with_capacity(width);
                for idx in 0..width {
                    let value: Option<String> = row.get(idx)?;
                    values.push(SqlValue::from(value));
                }
                rows.push(Row::new(values));
            }
            Ok(rows)
        })
        .await
    }

    async fn execute_non_query(&self, sql: &str) -> Result<u64> {
        self.log_sql(sql);
        let sql = sql.to_string();
        self.with_conn(move |conn| {
            let stmt = conn.execute(&sql, &[])?;
            if is_ddl(&sql) {
                Ok(1)
            } else {
                Ok(stmt.row_count()?)
            }
        })
        .await
    }

    async fn begin_transaction(&self) -> Result<()> {
        // Sessions run without autocommit; the scope ends at commit/rollback.
        debug!("Begin transaction");
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        debug!("Commit");
        self.with_conn(|conn| Ok(conn.commit()?)).await
    }

    async fn rollback(&self) -> Result<()> {
        debug!("Rollback");
        self.with_conn(|conn| Ok(conn.rollback()?)).await
    }

    fn set_log(&self, log: Option<SqlLog>) {
        match self.log.lock() {
            Ok(mut guard) => *guard = log,
            Err(poisoned) => *poisoned.into_inner() = log,
        }
    }

    async fn close(&self) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let taken = match conn.lock() {
                Ok(mut guard) => guard.take(),
                Err(poisoned) => poisoned.into_inner().take(),
            };
            match taken {
                Some(conn) => Ok(conn.close()?),
                None => Ok(()),
            }
        })
        .await
        .map_err(join_error)?
    }
}
