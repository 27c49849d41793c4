//! Async key-value persistence.
//!
//! The store writes whole values per key: the ordered collection list under
//! one key, the collapsed map under another. There are no transactions;
//! whoever saves a key last wins.

mod json_file;
mod memory;

pub use json_file::JsonFileGateway;
pub use memory::MemoryGateway;

use std::future::Future;

use serde_json::Value;

use crate::error::PersistenceError;

/// The storage area shared by every open instance
pub trait PersistenceGateway: Send + Sync {
    /// Load a key. A missing key is `Ok(None)`.
    fn load(&self, key: &str)
        -> impl Future<Output = Result<Option<Value>, PersistenceError>> + Send;

    /// Overwrite a key
    fn save(&self, key: &str, value: Value)
        -> impl Future<Output = Result<(), PersistenceError>> + Send;

    /// Delete a key; deleting a missing key succeeds
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    /// Delete every key
    fn clear(&self) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}
