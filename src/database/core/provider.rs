//! Shared database provider
//!
//! A [`DbProvider`] owns one SQLite connection behind a mutex so a single handle
//! can be shared by every test thread of a process. [`ProviderSlot`] holds the
//! registered provider and accepts exactly one assignment.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use anyhow::{anyhow, Result};

use super::connection::DatabaseConn;
use super::schema::TableDescriptor;
use super::store::{SchemaStore, SeedRow};

/// Thread-shareable database handle
pub struct DbProvider {
    dsn: String,
    db: Mutex<DatabaseConn>,
}

impl DbProvider {
    /// Open a provider for the given DSN (a file path or `:memory:`)
    pub fn open(dsn: &str) -> Result<Self> {
        let db = DatabaseConn::open_dsn(dsn)?;
        Ok(Self {
            dsn: dsn.to_string(),
            db: Mutex::new(db),
        })
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// Lock the underlying connection
    pub fn lock(&self) -> Result<MutexGuard<'_, DatabaseConn>> {
        self.db
            .lock()
            .map_err(|_| anyhow!("Database connection for '{}' is poisoned", self.dsn))
    }
}

impl std::fmt::Debug for DbProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbProvider").field("dsn", &self.dsn).finish()
    }
}

impl SchemaStore for DbProvider {
    fn create_table(&self, table: &TableDescriptor) -> Result<()> {
        self.lock()?.create_table(table)
    }

    fn drop_table(&self, table: &TableDescriptor) -> Result<()> {
        self.lock()?.drop_table(table)
    }

    fn probe(&self, table: &str) -> Result<()> {
        self.lock()?.probe(table)
    }

    fn insert_if_absent(&self, row: &SeedRow) -> Result<bool> {
        self.lock()?.insert_if_absent(row)
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        self.lock()?.table_exists(table)
    }

    fn table_count(&self, table: &str) -> Result<u64> {
        self.lock()?.table_count(table)
    }

    fn missing_columns(&self, table: &TableDescriptor) -> Result<Vec<&'static str>> {
        self.lock()?.missing_columns(table)
    }
}

/// Single-assignment holder of the registered database provider
#[derive(Debug, Default)]
pub struct ProviderSlot {
    slot: OnceLock<Arc<DbProvider>>,
}

impl ProviderSlot {
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    pub fn has_provider(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn get(&self) -> Option<Arc<DbProvider>> {
        self.slot.get().cloned()
    }

    /// Register a provider; returns `false` and leaves the slot unchanged if one is already set
    pub fn set(&self, provider: Arc<DbProvider>) -> bool {
        self.slot.set(provider).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_provider_store() {
        let provider = DbProvider::open(":memory:").unwrap();
        let cameras = crate::database::core::SchemaDefinitions::table("cameras").unwrap();

        provider.create_table(&cameras).unwrap();
        assert!(provider.table_exists("cameras").unwrap());
        assert!(provider.probe("cameras").is_ok());
        assert_eq!(provider.dsn(), ":memory:");
    }

    #[test]
    fn test_slot_single_assignment() {
        let slot = ProviderSlot::new();
        assert!(!slot.has_provider());

        let first = Arc::new(DbProvider::open(":memory:").unwrap());
        let second = Arc::new(DbProvider::open(":memory:").unwrap());

        assert!(slot.set(Arc::clone(&first)));
        assert!(!slot.set(second));

        let registered = slot.get().unwrap();
        assert!(Arc::ptr_eq(&registered, &first));
    }

    #[test]
    fn test_slot_concurrent_registration() {
        let slot = Arc::new(ProviderSlot::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let slot = Arc::clone(&slot);
                thread::spawn(move || {
                    let provider = Arc::new(DbProvider::open(":memory:").unwrap());
                    slot.set(provider)
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
