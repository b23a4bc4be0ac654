//! Typed JSON cell over a [`KeyValueStore`].

use super::{SharedStore, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// A single typed record stored as JSON under a fixed key.
///
/// The explicit lifecycle is `init` / `read` / `write` / `clear`. A
/// `write` always replaces the whole value; there is no field-level
/// update.
///
/// # Example
///
/// ```
/// use aegis_runtime::storage::{JsonSlot, MemoryStore, SharedStore};
/// use std::sync::Arc;
///
/// let store: SharedStore = Arc::new(MemoryStore::new());
/// let slot: JsonSlot<Vec<u32>> = JsonSlot::new(store, "numbers");
///
/// assert_eq!(slot.read().unwrap(), None);
/// assert_eq!(slot.init().unwrap(), Vec::<u32>::new());
/// slot.write(&vec![1, 2]).unwrap();
/// assert_eq!(slot.read().unwrap(), Some(vec![1, 2]));
/// slot.clear().unwrap();
/// assert_eq!(slot.read().unwrap(), None);
/// ```
pub struct JsonSlot<T> {
    store: SharedStore,
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSlot<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a slot for `key` in `store`.
    pub fn new(store: SharedStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            _marker: PhantomData,
        }
    }

    /// Returns the storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads and decodes the value, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails or the JSON is malformed.
    pub fn read(&self) -> Result<Option<T>, StorageError> {
        match self.store.get(&self.key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Encodes and stores `value`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the store fails.
    pub fn write(&self, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.store.set(&self.key, &json)
    }

    /// Removes the value. Clearing an empty slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(&self.key)
    }

    /// Returns the stored value, writing `T::default()` first if absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if reading or writing fails.
    pub fn init(&self) -> Result<T, StorageError>
    where
        T: Default,
    {
        if let Some(value) = self.read()? {
            return Ok(value);
        }
        let value = T::default();
        self.write(&value)?;
        Ok(value)
    }
}

impl<T> Clone for JsonSlot<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for JsonSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSlot").field("key", &self.key).finish()
    }
}
