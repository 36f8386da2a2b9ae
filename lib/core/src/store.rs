use crate::{Collection, CollectionConfig, Error, Result};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of [`VectorStore::ensure_collection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    Created,
    Reused,
}

impl Ensured {
    pub fn created(self) -> bool {
        self == Ensured::Created
    }
}

/// Process-wide registry of named collections
#[derive(Default)]
pub struct VectorStore {
    collections: RwLock<AHashMap<String, Arc<Collection>>>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the named collection, creating it from `config` if absent.
    ///
    /// An existing collection is returned as-is, even when its configuration
    /// differs from `config`; it is never dropped and recreated.
    pub fn ensure_collection(&self, config: CollectionConfig) -> Result<(Arc<Collection>, Ensured)> {
        if config.vector_dim == 0 {
            return Err(Error::InvalidConfig(format!(
                "collection '{}' must have a non-zero vector dimension",
                config.name
            )));
        }

        if let Some(existing) = self.get_collection(&config.name) {
            if existing.config() != &config {
                warn!(
                    collection = %config.name,
                    existing_dim = existing.vector_dim(),
                    requested_dim = config.vector_dim,
                    "Reusing collection with a different configuration"
                );
            }
            return Ok((existing, Ensured::Reused));
        }

        let mut collections = self.collections.write();
        // Another caller may have created it between the read and the write lock.
        if let Some(existing) = collections.get(&config.name) {
            return Ok((existing.clone(), Ensured::Reused));
        }

        let name = config.name.clone();
        info!(
            collection = %name,
            dim = config.vector_dim,
            distance = ?config.distance,
            "Creating collection"
        );
        let collection = Arc::new(Collection::new(config));
        collections.insert(name, collection.clone());
        Ok((collection, Ensured::Created))
    }

    #[inline]
    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(name).cloned()
    }

    /// Like [`get_collection`](Self::get_collection) but fails with
    /// [`Error::CollectionNotFound`].
    pub fn collection(&self, name: &str) -> Result<Arc<Collection>> {
        self.get_collection(name)
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))
    }

    #[must_use]
    pub fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    #[inline]
    #[must_use]
    pub fn collection_exists(&self, name: &str) -> bool {
        self.collections.read().contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Distance;

    #[test]
    fn test_ensure_collection_is_idempotent() {
        let store = VectorStore::new();
        let config = CollectionConfig::new("technical_reports", 1024, Distance::Cosine);

        let (first, ensured) = store.ensure_collection(config.clone()).unwrap();
        assert!(ensured.created());

        let (second, ensured) = store.ensure_collection(config).unwrap();
        assert_eq!(ensured, Ensured::Reused);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.list_collections(), vec!["technical_reports".to_string()]);
    }

    #[test]
    fn test_ensure_collection_keeps_existing_config() {
        let store = VectorStore::new();
        store
            .ensure_collection(CollectionConfig::new("docs", 1024, Distance::Cosine))
            .unwrap();

        let (collection, ensured) = store
            .ensure_collection(CollectionConfig::new("docs", 8, Distance::Cosine))
            .unwrap();
        assert_eq!(ensured, Ensured::Reused);
        assert_eq!(collection.vector_dim(), 1024);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let store = VectorStore::new();
        let err = store
            .ensure_collection(CollectionConfig::new("bad", 0, Distance::Cosine))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(!store.collection_exists("bad"));
    }

    #[test]
    fn test_missing_collection() {
        let store = VectorStore::new();
        assert!(matches!(
            store.collection("nope"),
            Err(Error::CollectionNotFound(name)) if name == "nope"
        ));
    }
}
