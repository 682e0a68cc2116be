// ABOUTME: Shared application state for the petstore HTTP server.
// ABOUTME: Holds the storage backend every handler talks to.

use std::sync::Arc;

use petstore_store::{PetStore, StoreError};

use crate::api::ApiError;

/// Shared application state accessible by all Axum handlers.
pub struct AppState {
    pub store: Arc<dyn PetStore>,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: Arc<dyn PetStore>) -> Self {
        Self { store }
    }

    /// Run a store operation on the blocking pool. Backends may block on a
    /// lock or on disk.
    pub async fn with_store<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn PetStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| {
                tracing::error!("store task failed: {}", e);
                ApiError::Internal
            })?;
        Ok(result?)
    }
}
