//! Core database infrastructure
//!
//! This module provides the foundational database components used throughout entity-store:
//! - `DatabaseConn`: Core SQLite connection wrapper with configuration
//! - `DbProvider` / `ProviderSlot`: Thread-shareable connection and its registration slot
//! - `SchemaStore`: Storage capabilities the schema lifecycle relies on
//! - `SchemaDefinitions`: Table schemas of every entity

mod connection;
mod provider;
mod schema;
mod store;

pub use connection::{DatabaseConn, MEMORY_DSN};
pub use provider::{DbProvider, ProviderSlot};
pub use schema::{
    quote_ident, ColumnDef, IndexDef, SchemaDefinitions, TableDescriptor, TableSchema,
};
pub use store::{SchemaStore, SeedRow};
