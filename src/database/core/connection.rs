//! Database connection management
//!
//! This module provides the core database connection wrapper used throughout entity-store.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{anyhow, Result};
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use super::schema::{quote_ident, TableDescriptor, TableSchema};
use super::store::{SchemaStore, SeedRow};

/// DSN selecting an in-memory database
pub const MEMORY_DSN: &str = ":memory:";

/// How long a statement waits on a locked database file before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Core database connection wrapper
///
/// `DatabaseConn` provides a thin wrapper around SQLite connections,
/// handling both file-based and in-memory databases with consistent
/// configuration and error handling.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created.
    pub fn open(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)
                .map_err(|e| anyhow!("Failed to open database at '{}': {}", p, e))?,
            None => Connection::open_in_memory()
                .map_err(|e| anyhow!("Failed to create in-memory database: {}", e))?,
        };

        let db = DatabaseConn { conn };
        db.configure()?;
        Ok(db)
    }

    /// Open a database from a DSN
    ///
    /// An empty DSN or `:memory:` opens an in-memory database, anything else is a file path.
    pub fn open_dsn(dsn: &str) -> Result<Self> {
        let dsn = dsn.trim();
        if dsn.is_empty() || dsn == MEMORY_DSN {
            Self::open(None)
        } else {
            Self::open(Some(dsn))
        }
    }

    /// Open a database at the specified path (convenience method)
    pub fn open_path(path: &str) -> Result<Self> {
        Self::open(Some(path))
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(None)
    }

    fn configure(&self) -> Result<()> {
        // WAL lets concurrent test processes read while one of them migrates
        let _: String = self
            .conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to set journal mode: {}", e))?;

        self.conn
            .execute("PRAGMA synchronous=NORMAL", [])
            .map_err(|e| anyhow!("Failed to set synchronous mode: {}", e))?;

        self.conn
            .execute("PRAGMA temp_store=MEMORY", [])
            .map_err(|e| anyhow!("Failed to set temp store: {}", e))?;

        self.conn
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| anyhow!("Failed to set busy timeout: {}", e))?;

        Ok(())
    }

    /// Execute a SQL statement
    pub fn execute(&self, sql: &str) -> Result<usize> {
        self.conn
            .execute(sql, [])
            .map_err(|e| anyhow!("Failed to execute SQL: {}", e))
    }

    /// Execute a SQL statement with parameters
    pub fn execute_with_params<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<usize> {
        self.conn
            .execute(sql, params)
            .map_err(|e| anyhow!("Failed to execute SQL with params: {}", e))
    }

    /// Names of the columns an existing table has
    fn existing_columns(&self, table_name: &str) -> Result<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table_name)))
            .map_err(|e| anyhow!("Failed to read columns of '{}': {}", table_name, e))?;

        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<HashSet<_>, _>>()
            .map_err(|e| anyhow!("Failed to read columns of '{}': {}", table_name, e))?;

        Ok(columns)
    }
}

impl SchemaStore for DatabaseConn {
    fn create_table(&self, table: &TableDescriptor) -> Result<()> {
        if self.table_exists(table.name)? {
            for name in self.missing_columns(table)? {
                let Some(column) = table.schema.column(name) else {
                    continue;
                };
                debug!("entity: adding column {}.{}", table.name, name);
                self.conn
                    .execute(&TableSchema::add_column_sql(table.name, column), [])
                    .map_err(|e| {
                        anyhow!("Failed to add column {}.{}: {}", table.name, name, e)
                    })?;
            }
        } else {
            self.conn
                .execute_batch(&table.create_sql())
                .map_err(|e| anyhow!("Failed to create {} table: {}", table.name, e))?;
        }

        for index_sql in table.index_sql() {
            self.conn
                .execute(&index_sql, [])
                .map_err(|e| anyhow!("Failed to create {} index: {}", table.name, e))?;
        }

        Ok(())
    }

    fn drop_table(&self, table: &TableDescriptor) -> Result<()> {
        self.conn
            .execute(&table.drop_sql(), [])
            .map_err(|e| anyhow!("Failed to drop {} table: {}", table.name, e))?;
        Ok(())
    }

    fn probe(&self, table: &str) -> Result<()> {
        // Preparing fails while the table is not visible; an empty table is still a success
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT 1 FROM {} LIMIT 1", quote_ident(table)))
            .map_err(|e| anyhow!("Table '{}' is not queryable: {}", table, e))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| anyhow!("Table '{}' is not queryable: {}", table, e))?;
        rows.next()
            .map_err(|e| anyhow!("Table '{}' is not queryable: {}", table, e))?;
        Ok(())
    }

    fn insert_if_absent(&self, row: &SeedRow) -> Result<bool> {
        let key_values = row.key_values().ok_or_else(|| {
            anyhow!(
                "Seed row for '{}' lacks a value for key {:?}",
                row.table,
                row.key
            )
        })?;

        let columns: Vec<String> = row.values.iter().map(|(c, _)| quote_ident(c)).collect();
        let placeholders: Vec<String> = (1..=row.values.len()).map(|i| format!("?{}", i)).collect();
        let conditions: Vec<String> = row
            .key
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", quote_ident(column), row.values.len() + i + 1))
            .collect();
        let sql = format!(
            "INSERT INTO {table} ({columns}) SELECT {placeholders} \
             WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE {conditions})",
            table = quote_ident(row.table),
            columns = columns.join(", "),
            placeholders = placeholders.join(", "),
            conditions = conditions.join(" AND "),
        );

        let params = row
            .values
            .iter()
            .map(|(_, value)| value)
            .chain(key_values);

        let inserted = self
            .conn
            .execute(&sql, params_from_iter(params))
            .map_err(|e| anyhow!("Failed to insert into {}: {}", row.table, e))?;

        Ok(inserted > 0)
    }

    fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table_name],
                |row| row.get(0),
            )
            .map_err(|e| anyhow!("Failed to check table existence: {}", e))?;
        Ok(count > 0)
    }

    fn table_count(&self, table_name: &str) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM {}", quote_ident(table_name));
        let count: u64 = self
            .conn
            .query_row(&query, [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to get table count: {}", e))?;
        Ok(count)
    }

    fn missing_columns(&self, table: &TableDescriptor) -> Result<Vec<&'static str>> {
        let existing = self.existing_columns(table.name)?;
        Ok(table
            .schema
            .columns
            .iter()
            .filter(|c| !existing.contains(c.name))
            .map(|c| c.name)
            .collect())
    }
}
