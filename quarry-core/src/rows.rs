use crate::Value;
use std::sync::Arc;

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted identifier when available.
    pub last_affected_id: Option<i64>,
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values()[i])
    }
}

/// The rows returned by a query, already read from the driver.
#[derive(Debug)]
pub struct Rows {
    labels: RowNames,
    rows: std::vec::IntoIter<Row>,
}

impl Rows {
    pub fn new(labels: RowNames, rows: Vec<Row>) -> Self {
        Self {
            labels,
            rows: rows.into_iter(),
        }
    }
    pub fn empty() -> Self {
        Self::new(Arc::new([]), Vec::new())
    }
    pub fn columns(&self) -> &[String] {
        &self.labels
    }
}

impl Iterator for Rows {
    type Item = RowLabeled;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows
            .next()
            .map(|values| RowLabeled::new(self.labels.clone(), values))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Rows {}
