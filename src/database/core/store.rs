//! Storage capabilities required by the schema lifecycle
//!
//! [`SchemaStore`] is the seam between schema orchestration and the database
//! itself. [`DatabaseConn`](super::DatabaseConn) implements it for a single SQLite
//! connection and [`DbProvider`](super::DbProvider) for a connection shared
//! between threads.

use anyhow::Result;
use rusqlite::types::Value;

use super::schema::TableDescriptor;

/// A canonical row inserted only when no row with the same key exists
#[derive(Debug, Clone, PartialEq)]
pub struct SeedRow {
    pub table: &'static str,
    /// Identity columns used for the existence check; each must be present in `values`
    pub key: Vec<&'static str>,
    pub values: Vec<(&'static str, Value)>,
}

impl SeedRow {
    pub fn new(table: &'static str, key: &'static str) -> Self {
        Self::composite(table, &[key])
    }

    /// Row identified by several columns, e.g. a link table's composite primary key
    pub fn composite(table: &'static str, key: &[&'static str]) -> Self {
        Self {
            table,
            key: key.to_vec(),
            values: Vec::new(),
        }
    }

    /// Add a column value
    pub fn with(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.values.push((column, value.into()));
        self
    }

    pub fn value(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, value)| value)
    }

    /// Values of the key columns, or `None` if any of them is unset
    pub fn key_values(&self) -> Option<Vec<&Value>> {
        if self.key.is_empty() {
            return None;
        }
        self.key.iter().map(|column| self.value(column)).collect()
    }
}

/// Database operations the schema lifecycle depends on
pub trait SchemaStore {
    /// Create the table, or add its missing columns when it already exists
    fn create_table(&self, table: &TableDescriptor) -> Result<()>;

    /// Drop the table if it exists
    fn drop_table(&self, table: &TableDescriptor) -> Result<()>;

    /// Read-only query that succeeds once the table is visible and queryable
    fn probe(&self, table: &str) -> Result<()>;

    /// Insert the row unless its key already exists; returns whether a row was inserted
    fn insert_if_absent(&self, row: &SeedRow) -> Result<bool>;

    fn table_exists(&self, table: &str) -> Result<bool>;

    fn table_count(&self, table: &str) -> Result<u64>;

    /// Columns of the descriptor that the existing table lacks
    fn missing_columns(&self, table: &TableDescriptor) -> Result<Vec<&'static str>>;
}
