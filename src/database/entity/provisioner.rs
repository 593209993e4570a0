//! Table provisioning
//!
//! Creates and drops the tables of every registered entity. Any single failure
//! aborts the whole operation; there is no partial-success path.

use tracing::{debug, error};

use crate::database::core::SchemaStore;

use super::error::{FatalSchemaError, SchemaResult};
use super::registry::EntityRegistry;

pub struct TableProvisioner<'a, S: SchemaStore + ?Sized> {
    store: &'a S,
    registry: &'a EntityRegistry,
}

impl<'a, S: SchemaStore + ?Sized> TableProvisioner<'a, S> {
    pub fn new(store: &'a S, registry: &'a EntityRegistry) -> Self {
        Self { store, registry }
    }

    /// Create every registered table, adding missing columns to tables that already exist
    pub fn create_all(&self) -> SchemaResult<()> {
        for table in self.registry {
            debug!("entity: creating table {}", table.name);
            self.store.create_table(table).map_err(|e| {
                error!("entity: {:#}", e);
                FatalSchemaError::Create {
                    table: table.name.to_string(),
                    reason: format!("{:#}", e),
                }
            })?;
        }
        Ok(())
    }

    /// Drop every registered table that exists
    pub fn drop_all(&self) -> SchemaResult<()> {
        for table in self.registry {
            debug!("entity: dropping table {}", table.name);
            self.store.drop_table(table).map_err(|e| {
                error!("entity: {:#}", e);
                FatalSchemaError::Drop {
                    table: table.name.to_string(),
                    reason: format!("{:#}", e),
                }
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::DatabaseConn;
    use crate::database::entity::testing::RecordingStore;

    #[test]
    fn test_create_all() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let registry = EntityRegistry::entities();

        TableProvisioner::new(&db, registry).create_all().unwrap();

        for name in registry.names() {
            assert!(db.table_exists(name).unwrap(), "{} missing", name);
        }
    }

    #[test]
    fn test_drop_all() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let registry = EntityRegistry::entities();
        let provisioner = TableProvisioner::new(&db, registry);

        provisioner.create_all().unwrap();
        provisioner.drop_all().unwrap();

        for name in registry.names() {
            assert!(!db.table_exists(name).unwrap(), "{} still present", name);
        }

        // nothing left to drop
        provisioner.drop_all().unwrap();
    }

    #[test]
    fn test_create_failure_stops() {
        let registry = EntityRegistry::subset(&["cameras", "lenses", "countries"]).unwrap();
        let store = RecordingStore::new().failing_create("lenses");

        let err = TableProvisioner::new(&store, &registry)
            .create_all()
            .unwrap_err();

        assert!(matches!(err, FatalSchemaError::Create { ref table, .. } if table == "lenses"));
        assert_eq!(store.calls.lock().unwrap().creates, vec!["cameras", "lenses"]);
    }

    #[test]
    fn test_drop_failure_stops() {
        let registry = EntityRegistry::subset(&["cameras", "lenses"]).unwrap();
        let store = RecordingStore::new().failing_drop("cameras");

        let err = TableProvisioner::new(&store, &registry).drop_all().unwrap_err();

        assert!(matches!(err, FatalSchemaError::Drop { ref table, .. } if table == "cameras"));
        assert_eq!(store.calls.lock().unwrap().drops, vec!["cameras"]);
    }
}
