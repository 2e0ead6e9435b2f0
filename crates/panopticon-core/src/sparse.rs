//! Sparse INSERT construction.
//!
//! A [`SparseRow`] collects `(column, value)` pairs for only the fields a
//! report actually carried. Columns and values are stored side by side and can
//! only grow together, so the rendered statement always has as many
//! placeholders as bound parameters.

use std::fmt::Write as _;

use crate::field::Field;

/// A bindable SQL parameter, independent of any particular driver.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

/// Parameter placeholder dialect of the configured store.
///
/// Chosen once from configuration and handed to the store; nothing in the
/// request path inspects the payload to pick a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// `$1, $2, …` (PostgreSQL / SQLite / DuckDB style).
    #[default]
    Numbered,
    /// `?, ?, …` (MySQL style).
    Positional,
}

impl Placeholder {
    /// Parse a configuration value. Accepts the dialect names as well as the
    /// driver names older deployments configured (`sqlite3`, `postgres`, `mysql`).
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "numbered" | "dollar" | "sqlite3" | "sqlite" | "postgres" | "duckdb" => {
                Ok(Self::Numbered)
            }
            "positional" | "question" | "mysql" => Ok(Self::Positional),
            other => Err(format!(
                "unknown placeholder dialect {other:?}: expected numbered or positional"
            )),
        }
    }

    /// Render `count` comma-separated placeholders.
    pub fn render(self, count: usize) -> String {
        let mut out = String::with_capacity(count * 4);
        for i in 1..=count {
            if i > 1 {
                out.push_str(", ");
            }
            match self {
                Placeholder::Numbered => {
                    let _ = write!(out, "${i}");
                }
                Placeholder::Positional => out.push('?'),
            }
        }
        out
    }
}

/// The columns and values of one row, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRow {
    columns: Vec<&'static str>,
    values: Vec<SqlValue>,
}

impl SparseRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column that is always written.
    ///
    /// Column names are `&'static str` so they can only come from the
    /// compiled-in catalog, never from request data.
    pub fn push(&mut self, column: &'static str, value: impl Into<SqlValue>) {
        self.columns.push(column);
        self.values.push(value.into());
    }

    /// Append a column only if the field was sent. An explicit null is kept.
    pub fn push_field(&mut self, column: &'static str, field: Field<SqlValue>) {
        match field {
            Field::Absent => {}
            Field::Null => self.push(column, SqlValue::Null),
            Field::Present(value) => self.push(column, value),
        }
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }

    /// Value bound to `column`, if the column is part of the row.
    pub fn value_of(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| *c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Render the row as a parameterized `INSERT` against `table`.
    pub fn into_insert(self, table: &'static str, placeholder: Placeholder) -> InsertStatement {
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            self.columns.join(", "),
            placeholder.render(self.values.len()),
        );
        InsertStatement {
            sql,
            table,
            columns: self.columns,
            params: self.values,
        }
    }
}

/// A rendered statement plus the parameters to bind, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub sql: String,
    pub table: &'static str,
    pub columns: Vec<&'static str>,
    pub params: Vec<SqlValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> SparseRow {
        let mut row = SparseRow::new();
        row.push("homeserver", "example.org");
        row.push("local_timestamp", 1_700_000_000_i64);
        row.push("remote_addr", "10.0.0.1:4000");
        row
    }

    #[test]
    fn numbered_placeholders_count_from_one() {
        assert_eq!(Placeholder::Numbered.render(3), "$1, $2, $3");
    }

    #[test]
    fn positional_placeholders_are_bare() {
        assert_eq!(Placeholder::Positional.render(3), "?, ?, ?");
    }

    #[test]
    fn zero_placeholders_render_empty() {
        assert_eq!(Placeholder::Numbered.render(0), "");
    }

    #[test]
    fn new_row_is_empty_until_pushed() {
        let mut row = SparseRow::new();
        assert!(row.is_empty());
        row.push_field("memory_rss", Field::Absent);
        assert!(row.is_empty());
        row.push_field("memory_rss", Field::Null);
        assert!(!row.is_empty());
        assert_eq!(row.value_of("memory_rss"), Some(&SqlValue::Null));
    }

    #[test]
    fn absent_field_adds_neither_column_nor_value() {
        let mut row = sample_row();
        row.push_field("total_users", Field::Absent);
        assert_eq!(row.len(), 3);
        assert_eq!(row.values().len(), 3);
        assert!(!row.contains("total_users"));
    }

    #[test]
    fn null_field_is_written_as_null() {
        let mut row = sample_row();
        row.push_field("total_users", Field::Null);
        assert_eq!(row.value_of("total_users"), Some(&SqlValue::Null));
    }

    #[test]
    fn present_zero_is_not_dropped() {
        let mut row = sample_row();
        row.push_field("total_users", Field::Present(SqlValue::Int(0)));
        assert_eq!(row.value_of("total_users"), Some(&SqlValue::Int(0)));
    }

    #[test]
    fn insert_renders_numbered_statement() {
        let mut row = sample_row();
        row.push_field("total_users", Field::Present(SqlValue::Int(42)));
        let stmt = row.into_insert("stats", Placeholder::Numbered);
        assert_eq!(
            stmt.sql,
            "INSERT INTO stats (homeserver, local_timestamp, remote_addr, total_users) \
             VALUES ($1, $2, $3, $4)"
        );
        assert_eq!(stmt.params.len(), 4);
    }

    #[test]
    fn insert_renders_positional_statement() {
        let stmt = sample_row().into_insert("dendrite_stats", Placeholder::Positional);
        assert_eq!(
            stmt.sql,
            "INSERT INTO dendrite_stats (homeserver, local_timestamp, remote_addr) \
             VALUES (?, ?, ?)"
        );
    }

    #[test]
    fn parse_accepts_dialects_and_driver_names() {
        assert_eq!(Placeholder::parse("numbered"), Ok(Placeholder::Numbered));
        assert_eq!(Placeholder::parse("sqlite3"), Ok(Placeholder::Numbered));
        assert_eq!(Placeholder::parse("MySQL"), Ok(Placeholder::Positional));
        assert_eq!(Placeholder::parse("question"), Ok(Placeholder::Positional));
        assert!(Placeholder::parse("oracle").is_err());
    }
}
