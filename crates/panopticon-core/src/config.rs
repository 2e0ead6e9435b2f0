use std::time::Duration;

use crate::sparse::Placeholder;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Path of the DuckDB database file.
    pub db_path: String,
    /// Parameter placeholder dialect used when rendering inserts.
    pub placeholder: Placeholder,
    /// DuckDB size string, e.g. `"512MB"` or `"1GB"`.
    pub duckdb_memory_limit: String,
    pub persist_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 9001,
            db_path: "stats.db".to_string(),
            placeholder: Placeholder::Numbered,
            duckdb_memory_limit: "1GB".to_string(),
            persist_timeout_ms: 5000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        Ok(Self {
            port: match std::env::var("PANOPTICON_PORT") {
                Ok(v) => v.parse().map_err(|e| format!("invalid port: {e}"))?,
                Err(_) => defaults.port,
            },
            db_path: std::env::var("PANOPTICON_DB").unwrap_or(defaults.db_path),
            placeholder: match std::env::var("PANOPTICON_DB_PLACEHOLDER") {
                Ok(v) => Placeholder::parse(&v)?,
                Err(_) => defaults.placeholder,
            },
            duckdb_memory_limit: std::env::var("PANOPTICON_DUCKDB_MEMORY")
                .unwrap_or(defaults.duckdb_memory_limit),
            persist_timeout_ms: match std::env::var("PANOPTICON_PERSIST_TIMEOUT_MS") {
                Ok(v) => v
                    .parse()
                    .map_err(|e| format!("invalid persist timeout: {e}"))?,
                Err(_) => defaults.persist_timeout_ms,
            },
        })
    }

    pub fn persist_timeout(&self) -> Duration {
        Duration::from_millis(self.persist_timeout_ms)
    }
}
