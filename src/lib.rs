#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! entity-store - Schema lifecycle for a photo library database
//!
//! entity-store brings the SQLite schema of a photo library into a usable state:
//! it creates every entity table, waits until each one is queryable, inserts the
//! "unknown" default rows and, for tests, loads a fixed set of fixture rows
//! exactly once per process. It can be used as both a command-line application
//! and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (none) | Schema lifecycle library | `rusqlite`, `config` |
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `cli` | `entity-store` binary | All above + `clap`, `tracing-subscriber` |
//!
//! ## Choosing Features
//!
//! ```toml
//! # Library only
//! entity-store = { version = "0.3", default-features = false }
//!
//! # Default (CLI binary)
//! entity-store = "0.3"
//! ```
//!
//! # Architecture
//!
//! - **[`database`]**: All database functionality
//!   - `core`: SQLite connection, shared provider and table schemas
//!   - `entity`: registry, provisioning, migration waiting, lifecycle and test bootstrap
//!
//! - **[`config`]**: Configuration management
//!
//! # Quick Start Examples
//!
//! ## Bootstrap
//!
//! ```rust,ignore
//! use entity_store::{DatabaseConn, EntityConfig, EntityRegistry, SchemaLifecycle};
//!
//! let config = EntityConfig::new(&None)?;
//! let db = DatabaseConn::open_dsn(&config.database)?;
//!
//! SchemaLifecycle::new(&db, EntityRegistry::entities())
//!     .with_policy(config.wait_policy())
//!     .migrate_database()?;
//! ```
//!
//! ## Tests
//!
//! ```rust,ignore
//! use entity_store::TestDatabase;
//!
//! let testdb = TestDatabase::global();
//! testdb.init_test_db(":memory:")?;
//! testdb.init_test_fixtures()?; // no-op after the first run
//! ```

pub mod config;
pub mod database;

// =============================================================================
// Configuration
// =============================================================================

pub use config::{format_size, EntityConfig};

// =============================================================================
// Database Module - Re-export commonly used types
// =============================================================================

pub use database::{
    DatabaseConn, DbProvider, EntityRegistry, FatalSchemaError, SchemaLifecycle, SchemaReport,
    SchemaStore, TableStatus, TestDatabase, WaitPolicy,
};
