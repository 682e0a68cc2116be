// ABOUTME: Named-factory registry that resolves a configured store name to a backend.
// ABOUTME: Built once at startup and passed explicitly to whoever needs to resolve stores.

use std::collections::HashMap;
use std::sync::Arc;

use petstore_core::StoreConfig;

use crate::memory::MemoryPetStore;
use crate::sqlite::SqlitePetStore;
use crate::store::{PetStore, StoreError};

/// Builds a backend from the store section of the configuration.
pub type Provider = Box<dyn Fn(&StoreConfig) -> Arc<dyn PetStore> + Send + Sync>;

/// Maps provider names to factories. Registration happens during startup,
/// before any resolution, so the map is never mutated concurrently.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Provider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the in-memory and SQLite providers installed.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(MemoryPetStore::NAME, |_| Arc::new(MemoryPetStore::new()));
        registry.register(SqlitePetStore::NAME, |cfg| {
            Arc::new(SqlitePetStore::from_store_config(cfg))
        });
        registry
    }

    /// Register a factory under `name`. A later registration with the same
    /// name replaces the earlier one.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&StoreConfig) -> Arc<dyn PetStore> + Send + Sync + 'static,
    {
        tracing::info!("add provider {:?}", name);
        self.providers.insert(name.to_string(), Box::new(factory));
    }

    /// Build the backend named by `cfg.name`.
    pub fn resolve(&self, cfg: &StoreConfig) -> Result<Arc<dyn PetStore>, StoreError> {
        let provider = self
            .providers
            .get(&cfg.name)
            .ok_or_else(|| StoreError::ProviderNotFound(cfg.name.clone()))?;
        tracing::info!("using store provider {:?}", cfg.name);
        Ok(provider(cfg))
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
