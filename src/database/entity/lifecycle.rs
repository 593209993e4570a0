//! Schema lifecycle
//!
//! Composes provisioning, readiness waiting and default rows into the operations
//! run at bootstrap and in test setup:
//!
//! - `migrate_database`: create tables, wait until each is queryable, insert default rows
//! - `drop_tables`: drop every registered table
//! - `reset_database`: drop, migrate, and optionally load the test fixtures
//!
//! Every failure is a [`FatalSchemaError`]; the caller is expected to abort.

use serde::Serialize;
use tracing::{error, info};

use crate::database::core::{SchemaStore, SeedRow};

use super::error::{FatalSchemaError, SchemaResult};
use super::fixtures::create_test_fixtures;
use super::provisioner::TableProvisioner;
use super::registry::EntityRegistry;
use super::seed;
use super::waiter::{MigrationWaiter, Sleeper, ThreadSleeper, WaitPolicy};

static THREAD_SLEEPER: ThreadSleeper = ThreadSleeper;

/// State of one registered table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatus {
    pub name: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_columns: Vec<String>,
}

/// State of every registered table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub tables: Vec<TableStatus>,
}

impl SchemaReport {
    /// All tables exist with every expected column
    pub fn is_current(&self) -> bool {
        self.tables
            .iter()
            .all(|t| t.exists && t.missing_columns.is_empty())
    }

    /// One printable row per table
    pub fn rows(&self) -> Vec<TableStatusRow> {
        self.tables.iter().map(TableStatusRow::from).collect()
    }
}

/// Flattened [`TableStatus`] for table output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct TableStatusRow {
    pub table: String,
    pub status: String,
    pub rows: String,
    pub missing_columns: String,
}

impl From<&TableStatus> for TableStatusRow {
    fn from(status: &TableStatus) -> Self {
        let state = match (status.exists, status.missing_columns.is_empty()) {
            (false, _) => "missing",
            (true, true) => "ok",
            (true, false) => "outdated",
        };
        Self {
            table: status.name.clone(),
            status: state.to_string(),
            rows: status
                .row_count
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            missing_columns: status.missing_columns.join(", "),
        }
    }
}

pub struct SchemaLifecycle<'a, S: SchemaStore + ?Sized> {
    store: &'a S,
    registry: &'a EntityRegistry,
    policy: WaitPolicy,
    sleeper: &'a dyn Sleeper,
}

impl<'a, S: SchemaStore + ?Sized> SchemaLifecycle<'a, S> {
    pub fn new(store: &'a S, registry: &'a EntityRegistry) -> Self {
        Self {
            store,
            registry,
            policy: WaitPolicy::default(),
            sleeper: &THREAD_SLEEPER,
        }
    }

    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: &'a dyn Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn registry(&self) -> &EntityRegistry {
        self.registry
    }

    /// Create all tables, wait until they are queryable and insert the default rows
    pub fn migrate_database(&self) -> SchemaResult<()> {
        TableProvisioner::new(self.store, self.registry).create_all()?;
        MigrationWaiter::new(self.store, self.policy, self.sleeper).wait_for_all(self.registry)?;

        for row in seed::default_rows() {
            self.seed(&row)?;
        }

        info!("entity: migrated {} tables", self.registry.len());
        Ok(())
    }

    /// Drop the tables of all registered entities
    pub fn drop_tables(&self) -> SchemaResult<()> {
        TableProvisioner::new(self.store, self.registry).drop_all()
    }

    /// Drop and re-create all tables, optionally loading the test fixtures
    pub fn reset_database(&self, with_fixtures: bool) -> SchemaResult<()> {
        self.drop_tables()?;
        self.migrate_database()?;

        if with_fixtures {
            create_test_fixtures(self.store).map_err(|e| {
                error!("entity: {:#}", e);
                FatalSchemaError::Fixtures {
                    reason: format!("{:#}", e),
                }
            })?;
        }

        Ok(())
    }

    /// Existence, row count and missing columns of every registered table
    pub fn report(&self) -> anyhow::Result<SchemaReport> {
        let mut tables = Vec::with_capacity(self.registry.len());
        for table in self.registry {
            let exists = self.store.table_exists(table.name)?;
            let (row_count, missing_columns) = if exists {
                (
                    Some(self.store.table_count(table.name)?),
                    self.store
                        .missing_columns(table)?
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                )
            } else {
                (None, Vec::new())
            };
            tables.push(TableStatus {
                name: table.name.to_string(),
                exists,
                row_count,
                missing_columns,
            });
        }
        Ok(SchemaReport { tables })
    }

    fn seed(&self, row: &SeedRow) -> SchemaResult<()> {
        self.store.insert_if_absent(row).map_err(|e| {
            error!("entity: {:#}", e);
            FatalSchemaError::Seed {
                table: row.table.to_string(),
                reason: format!("{:#}", e),
            }
        })?;
        Ok(())
    }
}
