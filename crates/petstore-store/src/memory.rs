// ABOUTME: In-process PetStore backed by an ordered map behind a reader/writer lock.
// ABOUTME: Nothing survives the process; ids come from a counter that is never rewound.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use petstore_core::Pet;

use crate::store::{PetStore, StoreError};

#[derive(Debug, Default)]
struct Pets {
    by_id: BTreeMap<i64, Pet>,
    last_id: i64,
}

/// A PetStore that keeps every record in memory.
///
/// Reads share the lock; every mutation holds the write lock for its whole
/// check-and-mutate sequence, so concurrent updates and deletes of the same
/// id are serialized.
#[derive(Debug, Default)]
pub struct MemoryPetStore {
    pets: RwLock<Pets>,
}

impl MemoryPetStore {
    pub const NAME: &'static str = "in-memory";

    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section leaves the map consistent, so a panic in another
    // thread never invalidates the data and the guard can be recovered.
    fn read(&self) -> RwLockReadGuard<'_, Pets> {
        self.pets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Pets> {
        self.pets.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PetStore for MemoryPetStore {
    fn add_pet(&self, name: &str, race: &str, modifier: &str) -> Result<i64, StoreError> {
        let mut pets = self.write();
        pets.last_id += 1;
        let id = pets.last_id;
        pets.by_id.insert(id, Pet::new(id, name, race, modifier));
        Ok(id)
    }

    fn get_pet(&self, id: i64) -> Result<Pet, StoreError> {
        self.read()
            .by_id
            .get(&id)
            .cloned()
            .ok_or(StoreError::PetNotFound(id))
    }

    fn get_all_pets(&self) -> Result<Vec<Pet>, StoreError> {
        Ok(self.read().by_id.values().cloned().collect())
    }

    fn delete_pet(&self, id: i64) -> Result<(), StoreError> {
        self.write()
            .by_id
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::PetNotFound(id))
    }

    fn update_pet(
        &self,
        id: i64,
        name: &str,
        race: &str,
        modifier: &str,
    ) -> Result<bool, StoreError> {
        let mut pets = self.write();
        let pet = pets.by_id.get_mut(&id).ok_or(StoreError::PetNotFound(id))?;

        if pet.name == name && pet.race == race && pet.modifier == modifier {
            return Ok(false);
        }

        *pet = Pet::new(id, name, race, modifier);
        Ok(true)
    }

    fn open(&self) -> Result<(), StoreError> {
        tracing::info!("in-memory store opened");
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        tracing::info!("in-memory store closed");
        Ok(())
    }

    fn is_ready(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
