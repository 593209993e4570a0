//! Schema lifecycle error types

use thiserror::Error;

/// Failure that leaves the database schema unusable
///
/// Callers at process bootstrap must treat every variant as unrecoverable and
/// abort startup rather than continue against an inconsistent schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalSchemaError {
    #[error("failed to create table {table}: {reason}")]
    Create { table: String, reason: String },

    #[error("failed to drop table {table}: {reason}")]
    Drop { table: String, reason: String },

    #[error("migration failed: table {table} not queryable after {attempts} attempts: {last_error}")]
    MigrationTimeout {
        table: String,
        attempts: u32,
        last_error: String,
    },

    #[error("failed to insert default row into {table}: {reason}")]
    Seed { table: String, reason: String },

    #[error("failed to create test fixtures: {reason}")]
    Fixtures { reason: String },

    #[error("no database provider registered")]
    NoProvider,

    #[error("failed to open database provider '{dsn}': {reason}")]
    Provider { dsn: String, reason: String },
}

pub type SchemaResult<T> = Result<T, FatalSchemaError>;

/// Invalid registry construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("table {0} is registered more than once")]
    DuplicateTable(String),

    #[error("no entity table named {0}")]
    UnknownTable(String),
}
