use std::fmt::Write as _;

use panopticon_core::classify::ServerKind;
use panopticon_core::columns::{table_columns, ColumnType};

/// Connection-level settings applied once at open time.
///
/// `memory_limit` comes from `Config.duckdb_memory_limit`
/// (env `PANOPTICON_DUCKDB_MEMORY`, default `"1GB"`). Always set an explicit
/// limit: the DuckDB default of 80% of system RAM is not acceptable for a
/// server process.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;
"#
    )
}

/// `CREATE` statements for the table that stores reports of `kind`.
///
/// DuckDB has no `AUTOINCREMENT`; the surrogate key draws from a per-table
/// sequence instead. Both statements use `IF NOT EXISTS` so they are safe to
/// re-run on every startup. Columns come from the same catalog the insert
/// path reads from.
pub fn create_table_sql(kind: ServerKind) -> String {
    let table = kind.table();
    let mut sql = format!(
        "CREATE SEQUENCE IF NOT EXISTS {table}_id_seq START 1;\n\
         CREATE TABLE IF NOT EXISTS {table} (\n    \
         id                       BIGINT PRIMARY KEY DEFAULT nextval('{table}_id_seq')"
    );
    for (name, ty) in table_columns(kind) {
        let _ = write!(sql, ",\n    {name:<24} {}", sql_type(ty));
    }
    sql.push_str("\n);\n");
    sql
}

fn sql_type(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::BigInt => "BIGINT",
        ColumnType::Double => "DOUBLE",
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Text => "VARCHAR",
        ColumnType::ShortText => "VARCHAR(256)",
    }
}
