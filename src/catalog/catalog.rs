//! Relation Catalog for RelAlg
//!
//! This module maps relation names to relations. Base relations are
//! registered by the loader; the executor registers and removes
//! temporaries while evaluating nested expressions.

use indexmap::IndexMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::relation::Relation;
use crate::error::{Error, Result};

/// Relation Catalog - the live name to relation mapping
#[derive(Debug)]
pub struct Catalog {
    /// Relations by name, in registration order
    relations: RwLock<IndexMap<String, Arc<Relation>>>,
    /// Next temporary relation id
    next_temp_id: AtomicU64,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            relations: RwLock::new(IndexMap::new()),
            next_temp_id: AtomicU64::new(0),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Arc<Relation>>> {
        self.relations.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, Arc<Relation>>> {
        self.relations.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a relation, replacing any relation with the same name
    pub fn add(&self, relation: Relation) -> Arc<Relation> {
        let relation = Arc::new(relation);
        self.write()
            .insert(relation.name().to_string(), relation.clone());
        relation
    }

    /// Register every base relation
    pub fn load(&self, relations: impl IntoIterator<Item = Relation>) {
        let mut map = self.write();
        for relation in relations {
            map.insert(relation.name().to_string(), Arc::new(relation));
        }
    }

    /// Get a relation by name
    pub fn get(&self, name: &str) -> Result<Arc<Relation>> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::RelationNotFound(name.to_string()))
    }

    /// Remove a relation, returning it if it was registered
    pub fn remove(&self, name: &str) -> Option<Arc<Relation>> {
        self.write().shift_remove(name)
    }

    /// Check if a relation exists
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// List all relation names in registration order
    pub fn list_relations(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Number of registered relations
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Generate a fresh name for a temporary relation.
    ///
    /// Ids never repeat for the life of the catalog, and names that are
    /// already taken by a registered relation are skipped.
    pub fn temporary_name(&self, prefix: &str) -> String {
        loop {
            let id = self.next_temp_id.fetch_add(1, Ordering::Relaxed);
            let name = format!("{}_{}", prefix, id);
            if !self.contains(&name) {
                return name;
            }
        }
    }

    /// Schema of a relation as a formatted string (for .schema command)
    pub fn get_relation_info(&self, name: &str) -> Result<String> {
        let relation = self.get(name)?;
        let mut info = format!("Relation: {}\n", relation.name());
        info.push_str("Attributes:\n");
        for (position, attr) in relation.attribute_names().iter().enumerate() {
            info.push_str(&format!("  {} {}\n", position, attr));
        }
        info.push_str(&format!("Tuples: {}\n", relation.len()));
        Ok(info)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relation(name: &str) -> Relation {
        Relation::from_rows(name, &["id"], &[&["1"]]).unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let catalog = Catalog::new();
        catalog.add(relation("Emp"));

        let retrieved = catalog.get("Emp").unwrap();
        assert_eq!(retrieved.name(), "Emp");
        assert_eq!(retrieved.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let catalog = Catalog::new();
        let result = catalog.get("Foo");
        assert!(matches!(result, Err(Error::RelationNotFound(name)) if name == "Foo"));
    }

    #[test]
    fn test_add_overwrites() {
        let catalog = Catalog::new();
        catalog.add(relation("Emp"));
        catalog.add(Relation::from_rows("Emp", &["id"], &[&["1"], &["2"]]).unwrap());

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("Emp").unwrap().len(), 2);
    }

    #[test]
    fn test_remove() {
        let catalog = Catalog::new();
        catalog.load(vec![relation("A"), relation("B")]);
        assert!(catalog.contains("A"));

        assert!(catalog.remove("A").is_some());
        assert!(!catalog.contains("A"));
        assert!(catalog.remove("A").is_none());
        assert_eq!(catalog.list_relations(), vec!["B".to_string()]);
    }

    #[test]
    fn test_temporary_names_are_unique() {
        let catalog = Catalog::new();
        catalog.add(relation("temp_1"));

        let first = catalog.temporary_name("temp");
        let second = catalog.temporary_name("temp");

        assert_eq!(first, "temp_0");
        assert_eq!(second, "temp_2");
    }
}
