//! Entity registry
//!
//! Maps logical table names to their descriptors. The registry is built once and
//! never mutated afterwards.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::database::core::{SchemaDefinitions, TableDescriptor};

use super::error::RegistryError;

static ENTITIES: OnceLock<EntityRegistry> = OnceLock::new();

/// Immutable set of table descriptors with unique names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRegistry {
    tables: Vec<TableDescriptor>,
}

impl EntityRegistry {
    /// Build a registry from a set of descriptors
    pub fn new(tables: impl IntoIterator<Item = TableDescriptor>) -> Result<Self, RegistryError> {
        let tables: Vec<TableDescriptor> = tables.into_iter().collect();
        let mut seen = HashSet::new();
        for table in &tables {
            if !seen.insert(table.name) {
                return Err(RegistryError::DuplicateTable(table.name.to_string()));
            }
        }
        Ok(Self { tables })
    }

    /// The registry of every entity table in the photo library
    pub fn entities() -> &'static EntityRegistry {
        ENTITIES.get_or_init(|| EntityRegistry {
            tables: SchemaDefinitions::TABLES.to_vec(),
        })
    }

    /// Registry holding only the named entity tables
    pub fn subset(names: &[&str]) -> Result<Self, RegistryError> {
        let tables = names
            .iter()
            .map(|name| {
                SchemaDefinitions::table(name)
                    .ok_or_else(|| RegistryError::UnknownTable(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tables)
    }

    pub fn get(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tables.iter().map(|t| t.name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl<'a> IntoIterator for &'a EntityRegistry {
    type Item = &'a TableDescriptor;
    type IntoIter = std::slice::Iter<'a, TableDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities() {
        let registry = EntityRegistry::entities();
        assert_eq!(registry.len(), 19);
        assert!(registry.get("photos_keywords").is_some());
        assert!(registry.get("unknown").is_none());

        // built from a literal set with unique names
        assert!(EntityRegistry::new(registry.iter().copied()).is_ok());
    }

    #[test]
    fn test_entities_is_shared() {
        assert!(std::ptr::eq(
            EntityRegistry::entities(),
            EntityRegistry::entities()
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let cameras = SchemaDefinitions::table("cameras").unwrap();
        let err = EntityRegistry::new([cameras, cameras]).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTable("cameras".to_string()));
    }

    #[test]
    fn test_subset() {
        let registry = EntityRegistry::subset(&["cameras", "lenses"]).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["cameras", "lenses"]);

        assert_eq!(
            EntityRegistry::subset(&["cameras", "camras"]).unwrap_err(),
            RegistryError::UnknownTable("camras".to_string())
        );
        assert_eq!(
            EntityRegistry::subset(&["lenses", "lenses"]).unwrap_err(),
            RegistryError::DuplicateTable("lenses".to_string())
        );
    }

    #[test]
    fn test_empty() {
        let registry = EntityRegistry::new([]).unwrap();
        assert!(registry.is_empty());
    }
}
