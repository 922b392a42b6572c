//! In-memory row sink
//!
//! Keeps every row in emission order, which makes it the sink of choice for
//! asserting exactly what a loader produced.

use super::{Filter, Row, RowSink, SqlValue, Table};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Vec<Row>,
    /// State to restore on rollback; `Some` while a unit is open
    snapshot: Option<Vec<Row>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every row in insertion order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_in(&self, table: Table) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(move |row| row.table() == table)
    }

    pub fn count(&self, table: Table) -> usize {
        self.rows_in(table).count()
    }

    pub fn in_unit(&self) -> bool {
        self.snapshot.is_some()
    }

    fn next_row_id(&self, table: Table, column: &str) -> i64 {
        self.rows_in(table)
            .filter_map(|row| match row.get(column) {
                Some(SqlValue::Integer(id)) => Some(*id),
                _ => None,
            })
            .max()
            .unwrap_or(0)
            + 1
    }
}

impl RowSink for MemorySink {
    fn begin_unit(&mut self) -> Result<()> {
        self.snapshot = Some(self.rows.clone());
        Ok(())
    }

    fn insert_row(&mut self, row: &Row) -> Result<i64> {
        let mut row = row.clone();
        let row_id = match row.table().row_id_column() {
            Some(column) => match row.get(column) {
                Some(SqlValue::Integer(id)) => *id,
                _ => {
                    let id = self.next_row_id(row.table(), column);
                    row.set(column, SqlValue::Integer(id));
                    id
                }
            },
            None => self.count(row.table()) as i64 + 1,
        };
        self.rows.push(row);
        Ok(row_id)
    }

    fn update_rows(
        &mut self,
        table: Table,
        filter: &Filter,
        changes: &[(&'static str, SqlValue)],
    ) -> Result<usize> {
        let mut changed = 0;
        for row in self
            .rows
            .iter_mut()
            .filter(|row| row.table() == table && filter.matches(row))
        {
            for (column, value) in changes {
                row.set(*column, value.clone());
            }
            changed += 1;
        }
        Ok(changed)
    }

    fn query_row(&mut self, table: Table, filter: &Filter) -> Result<Option<Row>> {
        Ok(self.rows_in(table).find(|row| filter.matches(row)).cloned())
    }

    fn commit_unit(&mut self) -> Result<()> {
        self.snapshot = None;
        Ok(())
    }

    fn rollback_unit(&mut self) -> Result<()> {
        if let Some(rows) = self.snapshot.take() {
            self.rows = rows;
        }
        Ok(())
    }
}
