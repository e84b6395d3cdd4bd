//! Persisted key-value storage trait

use crate::domain::{Result, RoundsError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Opaque key-value storage for client state that outlives the process
///
/// Values are JSON documents. Implementations use interior mutability so a
/// store can be shared behind an `Arc`.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never written or has been removed
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove a key; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read and decode a typed value
///
/// # Errors
///
/// Returns a serialization error when the stored document does not decode
/// as `T`.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
            RoundsError::Serialization(format!("Stored value for '{key}' is unreadable: {e}"))
        }),
        None => Ok(None),
    }
}

/// Encode and write a typed value
pub fn save<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    store.set(key, serde_json::to_value(value)?)
}
