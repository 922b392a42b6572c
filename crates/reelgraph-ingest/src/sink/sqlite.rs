//! SQLite-backed row sink

use std::borrow::Cow;
use std::path::Path;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, OptionalExtension, ToSql};
use tracing::{debug, trace};

use super::{ddl, Filter, Row, RowSink, SqlValue, Table};
use crate::error::Result;

/// Enough for every insert/query/update shape a full run produces
const STATEMENT_CACHE_CAPACITY: usize = 64;

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            SqlValue::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl FromSql for SqlValue {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(SqlValue::Null),
            ValueRef::Integer(i) => Ok(SqlValue::Integer(i)),
            ValueRef::Real(f) => Ok(SqlValue::Real(f)),
            ValueRef::Text(_) => value.as_str().map(|s| SqlValue::Text(s.to_string())),
            ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

/// Row sink writing to a SQLite database file
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Open (creating if needed) the database at `path` and ensure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        debug!(path = %path.display(), "Opened SQLite database");
        Self::with_connection(conn)
    }

    /// Fresh in-memory database with the schema applied
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        // Bundled builds default this to ON; dangling references are expected
        conn.pragma_update(None, "foreign_keys", "OFF")?;
        ddl::init_schema(&conn)?;
        conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
        Ok(Self { conn })
    }

    /// Number of rows currently in `table`
    pub fn count(&self, table: Table) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.as_str());
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn where_clause(filter: &Filter, first_param: usize) -> String {
    if filter.terms().is_empty() {
        return String::new();
    }
    let terms: Vec<String> = filter
        .terms()
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} IS ?{}", column, first_param + i))
        .collect();
    format!(" WHERE {}", terms.join(" AND "))
}

impl RowSink for SqliteSink {
    fn begin_unit(&mut self) -> Result<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn insert_row(&mut self, row: &Row) -> Result<i64> {
        let columns: Vec<&str> = row.columns().collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            row.table().as_str(),
            columns.join(", "),
            placeholders.join(", ")
        );
        trace!(table = %row.table(), "Inserting row");

        let mut stmt = self.conn.prepare_cached(&sql)?;
        stmt.execute(params_from_iter(row.values()))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_rows(
        &mut self,
        table: Table,
        filter: &Filter,
        changes: &[(&'static str, SqlValue)],
    ) -> Result<usize> {
        if changes.is_empty() {
            return Ok(0);
        }
        let assignments: Vec<String> = changes
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {}{}",
            table.as_str(),
            assignments.join(", "),
            where_clause(filter, changes.len() + 1)
        );

        let params = changes
            .iter()
            .map(|(_, value)| value)
            .chain(filter.terms().iter().map(|(_, value)| value));
        let mut stmt = self.conn.prepare_cached(&sql)?;
        Ok(stmt.execute(params_from_iter(params))?)
    }

    fn query_row(&mut self, table: Table, filter: &Filter) -> Result<Option<Row>> {
        let sql = format!("SELECT * FROM {}{} LIMIT 1", table.as_str(), where_clause(filter, 1));
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let found = stmt
            .query_row(params_from_iter(filter.terms().iter().map(|(_, v)| v)), |r| {
                let mut row = Row::new(table);
                for (i, name) in names.iter().enumerate() {
                    row.set(Cow::Owned(name.clone()), r.get::<_, SqlValue>(i)?);
                }
                Ok(row)
            })
            .optional()?;
        Ok(found)
    }

    fn commit_unit(&mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback_unit(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}
