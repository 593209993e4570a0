//! Entity schema lifecycle
//!
//! Everything needed to bring the photo library schema into a usable state:
//!
//! - `EntityRegistry`: the fixed set of entity tables
//! - `TableProvisioner`: creates and drops the registered tables in order
//! - `MigrationWaiter`: polls each table until it answers a probe query
//! - `SchemaLifecycle`: migrate, drop and reset built from the parts above
//! - `TestDatabase`: one-time provider registration and fixture loading for tests
//!
//! # Example
//!
//! ```rust,ignore
//! use entity_store::database::{DatabaseConn, EntityRegistry, SchemaLifecycle};
//!
//! let db = DatabaseConn::open_path("library.db")?;
//! SchemaLifecycle::new(&db, EntityRegistry::entities()).migrate_database()?;
//! ```

mod error;
mod fixtures;
mod gate;
mod lifecycle;
mod provisioner;
mod registry;
mod seed;
mod testdb;
mod waiter;

#[cfg(test)]
mod testing;

pub use error::{FatalSchemaError, RegistryError, SchemaResult};
pub use fixtures::{create_test_fixtures, fixture_rows};
pub use gate::FixtureGate;
pub use lifecycle::{SchemaLifecycle, SchemaReport, TableStatus, TableStatusRow};
pub use provisioner::TableProvisioner;
pub use registry::EntityRegistry;
pub use seed::{
    create_unknown_camera, create_unknown_country, create_unknown_lens, create_unknown_place,
    default_rows, UNKNOWN_ID, UNKNOWN_NAME, UNKNOWN_SLUG,
};
pub use testdb::TestDatabase;
pub use waiter::{
    MigrationAttempt, MigrationWaiter, Sleeper, ThreadSleeper, WaitPolicy,
    DEFAULT_MIGRATION_ATTEMPTS, DEFAULT_MIGRATION_BACKOFF,
};
