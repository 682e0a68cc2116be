// ABOUTME: Persistence layer for petstore: the storage contract and its backends.
// ABOUTME: Provides the in-memory and SQLite stores plus the registry that builds them by name.

pub mod memory;
pub mod registry;
pub mod sqlite;
pub mod store;
pub mod testing;

pub use memory::MemoryPetStore;
pub use registry::{Provider, ProviderRegistry};
pub use sqlite::SqlitePetStore;
pub use store::{PetStore, StoreError};
