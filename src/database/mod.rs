//! Database module
//!
//! This module provides all database functionality for entity-store, organized into:
//!
//! - **core**: Core database infrastructure (SQLite connections, providers, schema definitions)
//! - **entity**: Schema lifecycle for the photo library entities (migrate, drop, reset, fixtures)
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/             # Foundation
//! │   ├── connection    # SQLite DatabaseConn wrapper
//! │   ├── provider      # Mutex-guarded shared connection and its slot
//! │   ├── schema        # Table schemas of every entity
//! │   └── store         # SchemaStore trait and seed rows
//! │
//! └── entity/           # Schema lifecycle
//!     ├── registry      # Entity table registry
//!     ├── provisioner   # Create/drop all tables
//!     ├── waiter        # Poll tables until queryable
//!     ├── lifecycle     # Migrate, drop, reset, report
//!     ├── seed          # "Unknown" default rows
//!     ├── fixtures      # Test fixture rows
//!     ├── gate          # Run-once initialization
//!     └── testdb        # Shared test database bootstrap
//! ```
//!
//! # Usage
//!
//! ## Migrating a library database
//!
//! ```rust,ignore
//! use entity_store::database::{DatabaseConn, EntityRegistry, SchemaLifecycle};
//!
//! let db = DatabaseConn::open_path("library.sqlite3")?;
//! let lifecycle = SchemaLifecycle::new(&db, EntityRegistry::entities());
//!
//! // Any error here is fatal; abort startup
//! lifecycle.migrate_database()?;
//!
//! let report = lifecycle.report()?;
//! assert!(report.is_current());
//! ```
//!
//! ## Test setup
//!
//! ```rust,ignore
//! use entity_store::database::TestDatabase;
//!
//! // first caller registers the provider and loads the fixtures
//! TestDatabase::global().init_test_db(":memory:")?;
//! let provider = TestDatabase::global().provider();
//! ```

pub mod core;
pub mod entity;

// Core types
pub use core::{
    quote_ident, ColumnDef, DatabaseConn, DbProvider, IndexDef, ProviderSlot, SchemaDefinitions,
    SchemaStore, SeedRow, TableDescriptor, TableSchema, MEMORY_DSN,
};

// Schema lifecycle
pub use entity::{
    create_test_fixtures, EntityRegistry, FatalSchemaError, FixtureGate, MigrationWaiter,
    RegistryError, SchemaLifecycle, SchemaReport, SchemaResult, Sleeper, TableProvisioner,
    TableStatus, TableStatusRow, TestDatabase, ThreadSleeper, WaitPolicy, DEFAULT_MIGRATION_ATTEMPTS,
    DEFAULT_MIGRATION_BACKOFF,
};
