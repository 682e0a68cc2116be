// ABOUTME: The storage contract every petstore backend implements.
// ABOUTME: Also defines StoreError, the error taxonomy surfaced to the HTTP layer and lifecycle.

use petstore_core::Pet;
use thiserror::Error;

/// Errors that can occur in any storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("can not find pet {0}")]
    PetNotFound(i64),

    #[error("can not find provider {0:?}")]
    ProviderNotFound(String),

    #[error("store is not open")]
    NotOpen,

    #[error("readiness query returned {0}, expected 1")]
    NotReady(i64),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("transaction error: {0}")]
    Transaction(rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::PetNotFound(_))
    }
}

/// Uniform contract over pet storage. Callers only ever hand valid records
/// (all strings non-empty) to `add_pet` and `update_pet`.
pub trait PetStore: Send + Sync {
    /// Persist a new pet and return its freshly assigned id.
    fn add_pet(&self, name: &str, race: &str, modifier: &str) -> Result<i64, StoreError>;

    fn get_pet(&self, id: i64) -> Result<Pet, StoreError>;

    /// Every stored pet, ascending by id.
    fn get_all_pets(&self) -> Result<Vec<Pet>, StoreError>;

    fn delete_pet(&self, id: i64) -> Result<(), StoreError>;

    /// Overwrite a pet. Returns `Ok(false)` without touching storage when the
    /// stored values already match.
    fn update_pet(
        &self,
        id: i64,
        name: &str,
        race: &str,
        modifier: &str,
    ) -> Result<bool, StoreError>;

    /// Acquire the backend's live resource. Must complete before serving.
    fn open(&self) -> Result<(), StoreError>;

    /// Release the backend's live resource.
    fn close(&self) -> Result<(), StoreError>;

    /// Lightweight liveness probe.
    fn is_ready(&self) -> Result<(), StoreError>;
}
