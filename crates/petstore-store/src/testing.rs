// ABOUTME: Test utilities for petstore-store, including a call-counting spy store.
// ABOUTME: Used by lifecycle and handler tests to observe open/close and inject failures.

use std::sync::atomic::{AtomicUsize, Ordering};

use petstore_core::Pet;

use crate::memory::MemoryPetStore;
use crate::store::{PetStore, StoreError};

/// A PetStore that delegates to a `MemoryPetStore` while counting lifecycle
/// calls. `open`, `close`, and `is_ready` can be made to fail with a fixed
/// message.
#[derive(Debug, Default)]
pub struct SpyStore {
    inner: MemoryPetStore,
    open_calls: AtomicUsize,
    close_calls: AtomicUsize,
    open_error: Option<String>,
    close_error: Option<String>,
    ready_error: Option<String>,
}

fn failure(message: &Option<String>) -> Result<(), StoreError> {
    match message {
        Some(msg) => Err(StoreError::Io(std::io::Error::other(msg.clone()))),
        None => Ok(()),
    }
}

impl SpyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_open(mut self, message: &str) -> Self {
        self.open_error = Some(message.to_string());
        self
    }

    pub fn failing_close(mut self, message: &str) -> Self {
        self.close_error = Some(message.to_string());
        self
    }

    pub fn not_ready(mut self, message: &str) -> Self {
        self.ready_error = Some(message.to_string());
        self
    }

    pub fn open_calls(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

impl PetStore for SpyStore {
    fn add_pet(&self, name: &str, race: &str, modifier: &str) -> Result<i64, StoreError> {
        self.inner.add_pet(name, race, modifier)
    }

    fn get_pet(&self, id: i64) -> Result<Pet, StoreError> {
        self.inner.get_pet(id)
    }

    fn get_all_pets(&self) -> Result<Vec<Pet>, StoreError> {
        self.inner.get_all_pets()
    }

    fn delete_pet(&self, id: i64) -> Result<(), StoreError> {
        self.inner.delete_pet(id)
    }

    fn update_pet(
        &self,
        id: i64,
        name: &str,
        race: &str,
        modifier: &str,
    ) -> Result<bool, StoreError> {
        self.inner.update_pet(id, name, race, modifier)
    }

    fn open(&self) -> Result<(), StoreError> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        failure(&self.open_error)
    }

    fn close(&self) -> Result<(), StoreError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        failure(&self.close_error)
    }

    fn is_ready(&self) -> Result<(), StoreError> {
        failure(&self.ready_error)
    }
}
