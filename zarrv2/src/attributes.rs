//! User attributes of arrays and groups.
//!
//! Attributes are a JSON object stored under the `.zattrs` key of a node.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;
use zarrv2_metadata::AttributesMetadata;
use zarrv2_storage::{ReadableStorageTraits, StorageError, StoreKey, WritableStorageTraits};

/// An attributes error.
#[derive(Clone, Debug, Error)]
pub enum AttributesError {
    /// The attributes are read only.
    #[error("attributes are read only")]
    ReadOnly,
    /// A store error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
}

/// The user attributes of a node.
///
/// When `cache` is enabled, attributes are read from the store once and served from memory afterwards.
#[derive(Debug)]
pub struct Attributes<TStorage: ?Sized> {
    storage: Arc<TStorage>,
    key: StoreKey,
    read_only: bool,
    cache: bool,
    cached: RwLock<Option<AttributesMetadata>>,
}

impl<TStorage: ?Sized> Attributes<TStorage> {
    /// Create attributes stored at `key` of `storage`.
    #[must_use]
    pub fn new(storage: Arc<TStorage>, key: StoreKey, read_only: bool, cache: bool) -> Self {
        Self {
            storage,
            key,
            read_only,
            cache,
            cached: RwLock::new(None),
        }
    }

    /// The store key of the attributes.
    #[must_use]
    pub const fn key(&self) -> &StoreKey {
        &self.key
    }

    /// Returns true if the attributes are read only.
    #[must_use]
    pub const fn read_only(&self) -> bool {
        self.read_only
    }

    pub(crate) fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits> Attributes<TStorage> {
    fn load(&self) -> Result<AttributesMetadata, StorageError> {
        let Some(bytes) = self.storage.get(&self.key)? else {
            return Ok(AttributesMetadata::new());
        };
        Ok(
            serde_json::from_slice(&bytes).unwrap_or_else(|err: serde_json::Error| {
                log::warn!("ignoring invalid attributes at {}: {err}", self.key);
                AttributesMetadata::new()
            }),
        )
    }

    /// Returns all attributes.
    ///
    /// Attributes that are missing or cannot be parsed as a JSON object are empty.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store fails.
    pub fn as_map(&self) -> Result<AttributesMetadata, StorageError> {
        if self.cache {
            if let Some(attributes) = self.cached.read().as_ref() {
                return Ok(attributes.clone());
            }
        }
        let attributes = self.load()?;
        if self.cache {
            *self.cached.write() = Some(attributes.clone());
        }
        Ok(attributes)
    }

    /// Returns the attribute `name`, if it exists.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store fails.
    pub fn get_item(&self, name: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.as_map()?.remove(name))
    }

    /// Returns true if the attribute `name` exists.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store fails.
    pub fn contains_item(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.as_map()?.contains_key(name))
    }

    /// Returns the names of all attributes.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store fails.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.as_map()?.keys().cloned().collect())
    }

    /// Discard cached attributes.
    pub fn refresh(&self) {
        *self.cached.write() = None;
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits + WritableStorageTraits> Attributes<TStorage> {
    fn write(&self, attributes: AttributesMetadata) -> Result<(), AttributesError> {
        let bytes = serde_json::to_vec_pretty(&attributes)
            .map_err(|err| StorageError::InvalidMetadata(self.key.clone(), err.to_string()))?;
        self.storage.set(&self.key, bytes.into())?;
        if self.cache {
            *self.cached.write() = Some(attributes);
        }
        Ok(())
    }

    fn modify(
        &self,
        f: impl FnOnce(&mut AttributesMetadata),
    ) -> Result<(), AttributesError> {
        if self.read_only {
            return Err(AttributesError::ReadOnly);
        }
        // Always merge with the stored attributes rather than a possibly stale cache
        let mut attributes = self.load()?;
        f(&mut attributes);
        self.write(attributes)
    }

    /// Set the attribute `name` to `value`.
    ///
    /// # Errors
    /// Returns [`AttributesError::ReadOnly`] if the attributes are read only, or a store error.
    pub fn set_item(&self, name: &str, value: Value) -> Result<(), AttributesError> {
        self.modify(|attributes| {
            attributes.insert(name.to_string(), value);
        })
    }

    /// Delete the attribute `name`.
    ///
    /// # Errors
    /// Returns [`AttributesError::ReadOnly`] if the attributes are read only, or a store error.
    pub fn delete_item(&self, name: &str) -> Result<(), AttributesError> {
        self.modify(|attributes| {
            attributes.remove(name);
        })
    }

    /// Replace all attributes with `attributes`.
    ///
    /// # Errors
    /// Returns [`AttributesError::ReadOnly`] if the attributes are read only, or a store error.
    pub fn put(&self, attributes: AttributesMetadata) -> Result<(), AttributesError> {
        if self.read_only {
            return Err(AttributesError::ReadOnly);
        }
        self.write(attributes)
    }
}
