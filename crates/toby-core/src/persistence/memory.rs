//! Shared in-memory gateway.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use super::PersistenceGateway;
use crate::error::PersistenceError;

#[derive(Debug, Default)]
struct MemoryState {
    values: HashMap<String, Value>,
    fail_writes: bool,
    save_count: usize,
}

/// In-memory storage area.
///
/// Clones share the same map, so two stores built from clones behave like two
/// open pages over one browser profile.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save`/`remove`/`clear` fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut state) = self.inner.lock() {
            state.fail_writes = fail;
        }
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|s| s.save_count).unwrap_or(0)
    }

    /// Current raw value of a key
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner
            .lock()
            .ok()
            .and_then(|s| s.values.get(key).cloned())
    }

    /// Seed a key without counting as a save
    pub fn insert(&self, key: &str, value: Value) {
        if let Ok(mut state) = self.inner.lock() {
            state.values.insert(key.to_string(), value);
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, PersistenceError> {
        self.inner
            .lock()
            .map_err(|e| PersistenceError::Backend(format!("Mutex poisoned: {}", e)))
    }

    fn writable(&self) -> Result<MutexGuard<'_, MemoryState>, PersistenceError> {
        let state = self.state()?;
        if state.fail_writes {
            return Err(PersistenceError::Backend("write rejected".to_string()));
        }
        Ok(state)
    }
}

impl PersistenceGateway for MemoryGateway {
    async fn load(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        Ok(self.state()?.values.get(key).cloned())
    }

    async fn save(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        let mut state = self.writable()?;
        state.values.insert(key.to_string(), value);
        state.save_count += 1;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.writable()?.values.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        self.writable()?.values.clear();
        Ok(())
    }
}
