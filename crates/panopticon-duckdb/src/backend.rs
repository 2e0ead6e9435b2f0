use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use duckdb::{types::Value, Connection};
use tokio::sync::Mutex;
use tracing::{debug, info};

use panopticon_core::{
    classify::ServerKind,
    error::PersistError,
    report::StatsReport,
    sparse::{Placeholder, SqlValue},
    store::StatsStore,
};

use crate::schema::{create_table_sql, init_sql};

/// A DuckDB store for homeserver reports.
///
/// DuckDB is single-writer, so the connection sits behind an async mutex that
/// each insert holds only for the duration of its one statement. The struct
/// is shared across axum handlers behind an `Arc`.
///
/// The placeholder dialect is fixed at open time. DuckDB itself accepts both
/// `$N` and `?` parameters, which lets either dialect run against it.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
    placeholder: Placeholder,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path` and make sure both
    /// stats tables exist.
    pub fn open(path: &str, memory_limit: &str, placeholder: Placeholder) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("could not open database at {path}"))?;
        conn.execute_batch(&init_sql(memory_limit))?;
        Self::provision(&conn)?;
        info!(
            "DuckDB opened at {} with memory_limit={}, placeholder={:?}",
            path, memory_limit, placeholder
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            placeholder,
        })
    }

    /// Open an **in-memory** database.
    ///
    /// Intended for tests only; data is discarded when the struct is dropped.
    pub fn open_in_memory(placeholder: Placeholder) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        Self::provision(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            placeholder,
        })
    }

    /// Create the sequence and table for every report kind if absent.
    fn provision(conn: &Connection) -> Result<()> {
        for kind in ServerKind::ALL {
            conn.execute_batch(&create_table_sql(kind))
                .with_context(|| format!("could not create table {}", kind.table()))?;
        }
        Ok(())
    }

    /// Number of rows in the table for `kind`.
    pub async fn row_count(&self, kind: ServerKind) -> Result<i64> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    /// Acquire the connection lock for direct queries.
    ///
    /// Intended for integration tests that need to verify stored data.
    /// Production code should use the typed methods above.
    pub async fn conn_for_test(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}

#[async_trait]
impl StatsStore for DuckDbBackend {
    async fn insert_report(&self, report: &StatsReport) -> Result<(), PersistError> {
        let stmt = report.insert_statement(self.placeholder);
        let params = stmt.params.iter().map(to_duckdb);

        let conn = self.conn.lock().await;
        conn.execute(&stmt.sql, duckdb::params_from_iter(params))
            .with_context(|| format!("insert into {} failed", stmt.table))?;

        debug!(
            table = stmt.table,
            columns = stmt.columns.len(),
            "Report inserted"
        );
        Ok(())
    }

    /// Execute `SELECT 1`. Fails if the connection is unusable (file locked,
    /// disk full, etc.).
    async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("SELECT 1")?;
        Ok(())
    }
}

fn to_duckdb(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Int(v) => Value::BigInt(*v),
        SqlValue::Float(v) => Value::Double(*v),
        SqlValue::Bool(v) => Value::Boolean(*v),
        SqlValue::Text(v) => Value::Text(v.clone()),
    }
}
