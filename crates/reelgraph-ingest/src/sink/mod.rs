//! Row sink interface
//!
//! Loaders never talk to a database directly. They hand [`Row`]s to a
//! [`RowSink`], which owns persistence and the per-file commit unit.

mod ddl;
pub mod memory;
pub mod sqlite;

use std::borrow::Cow;
use std::fmt;

use crate::error::Result;
use crate::value::TypedValue;

pub use memory::MemorySink;
pub use sqlite::SqliteSink;

/// Relational tables the loaders write to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Title,
    TitleGenre,
    Person,
    KnownFor,
    Wrote,
    Directed,
    EpisodeOf,
    RegionInfo,
    PrincipalIn,
    Rating,
}

impl Table {
    pub const ALL: [Table; 10] = [
        Table::Title,
        Table::TitleGenre,
        Table::Person,
        Table::KnownFor,
        Table::Wrote,
        Table::Directed,
        Table::EpisodeOf,
        Table::RegionInfo,
        Table::PrincipalIn,
        Table::Rating,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Title => "Title",
            Table::TitleGenre => "TitleGenre",
            Table::Person => "Person",
            Table::KnownFor => "KnownFor",
            Table::Wrote => "Wrote",
            Table::Directed => "Directed",
            Table::EpisodeOf => "EpisodeOf",
            Table::RegionInfo => "RegionInfo",
            Table::PrincipalIn => "PrincipalIn",
            Table::Rating => "Rating",
        }
    }

    /// Integer primary key the store assigns when an insert omits it
    pub fn row_id_column(self) -> Option<&'static str> {
        match self {
            Table::Title => Some("TitleID"),
            Table::Person => Some("PersonID"),
            _ => None,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single stored field value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<&TypedValue> for SqlValue {
    fn from(value: &TypedValue) -> Self {
        match value {
            TypedValue::Null => SqlValue::Null,
            TypedValue::Integer(i) | TypedValue::Key(i) => SqlValue::Integer(*i),
            TypedValue::Real(f) => SqlValue::Real(*f),
            TypedValue::Boolean(b) => SqlValue::from(*b),
            TypedValue::Text(s) => SqlValue::Text(s.clone()),
            TypedValue::List(items) => SqlValue::Text(items.join(",")),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

pub type Column = Cow<'static, str>;

/// One row bound for (or read back from) a table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    table: Table,
    fields: Vec<(Column, SqlValue)>,
}

impl Row {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.set(Cow::Borrowed(column), value.into());
        self
    }

    /// Set `column`, replacing any existing value
    pub fn set(&mut self, column: impl Into<Column>, value: SqlValue) {
        let column = column.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> &[(Column, SqlValue)] {
        &self.fields
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_ref())
    }

    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.fields.iter().map(|(_, value)| value)
    }
}

/// Conjunction of column equality terms; null matches null
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    terms: Vec<(Column, SqlValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.terms.push((Cow::Borrowed(column), value.into()));
        self
    }

    pub fn terms(&self) -> &[(Column, SqlValue)] {
        &self.terms
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.terms.iter().all(|(column, expected)| {
            row.get(column).unwrap_or(&SqlValue::Null) == expected
        })
    }
}

/// Destination for loader output with per-unit atomicity
///
/// Outside a unit, writes take effect immediately. Inside a unit, writes are
/// visible to `query_row` but only become durable on `commit_unit`;
/// `rollback_unit` discards them and is a no-op when no unit is open.
pub trait RowSink {
    fn begin_unit(&mut self) -> Result<()>;

    /// Insert `row`, returning the row id the store assigned
    fn insert_row(&mut self, row: &Row) -> Result<i64>;

    /// Apply `changes` to every row of `table` matching `filter`
    fn update_rows(
        &mut self,
        table: Table,
        filter: &Filter,
        changes: &[(&'static str, SqlValue)],
    ) -> Result<usize>;

    /// First row of `table` matching `filter`
    fn query_row(&mut self, table: Table, filter: &Filter) -> Result<Option<Row>>;

    fn commit_unit(&mut self) -> Result<()>;

    fn rollback_unit(&mut self) -> Result<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_values_map_to_sql() {
        assert_eq!(SqlValue::from(&TypedValue::Key(42)), SqlValue::Integer(42));
        assert_eq!(SqlValue::from(&TypedValue::Boolean(true)), SqlValue::Integer(1));
        assert_eq!(SqlValue::from(&TypedValue::Null), SqlValue::Null);
        assert_eq!(
            SqlValue::from(&TypedValue::List(vec!["alternative".into(), "dvd".into()])),
            SqlValue::Text("alternative,dvd".into())
        );
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
    }

    #[test]
    fn test_row_set_replaces() {
        let mut row = Row::new(Table::Rating).with("TitleID", 1i64).with("VoteCount", 10i64);
        row.set("VoteCount", SqlValue::Integer(11));
        assert_eq!(row.get("VoteCount"), Some(&SqlValue::Integer(11)));
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["TitleID", "VoteCount"]);
    }

    #[test]
    fn test_filter_matching() {
        let row = Row::new(Table::Title)
            .with("OriginalTitle", "Prometheus")
            .with("StartYear", "2012");

        assert!(Filter::new().eq("OriginalTitle", "Prometheus").matches(&row));
        assert!(!Filter::new().eq("StartYear", 2012i64).matches(&row));
        assert!(Filter::new().eq("EndYear", SqlValue::Null).matches(&row));
        assert!(Filter::new().matches(&row));
    }
}
