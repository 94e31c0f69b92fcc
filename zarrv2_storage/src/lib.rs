//! The storage API for the `zarrv2` crate.
//!
//! A store is a key-value map from [`StoreKey`] to bytes.
//! Array metadata, attributes, and encoded chunks are all held as values of a store.
//!
//! The synchronous traits are:
//!  - [`ReadableStorageTraits`]: `get` and `size_key`, with `contains_key` derived,
//!  - [`WritableStorageTraits`]: `set`, `erase`, and `erase_prefix`,
//!  - [`ListableStorageTraits`]: `list`, `list_prefix`, and `list_dir`.
//!
//! The `async` feature adds asynchronous equivalents of each trait.
//!
//! This crate includes an in-memory store ([`store::MemoryStore`]) and the storage adapters in [`storage_adapter`].

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod maybe;
pub mod storage_adapter;
mod storage_sync;
pub mod store;
mod store_key;
mod store_prefix;

pub use maybe::{MaybeSend, MaybeSync};

#[cfg(feature = "async")]
mod storage_async;


use thiserror::Error;

pub use store_key::{StoreKey, StoreKeyError, StoreKeys};
pub use store_prefix::{StorePrefix, StorePrefixError, StorePrefixes};

#[cfg(feature = "async")]
pub use self::storage_async::{
    AsyncListableStorageTraits, AsyncReadableStorageTraits, AsyncWritableStorageTraits,
};

pub use self::storage_sync::{
    discover_children, ListableStorageTraits, ReadableStorageTraits, WritableStorageTraits,
};

/// The type for bytes used in store set and get methods.
///
/// An alias for [`bytes::Bytes`].
pub type Bytes = bytes::Bytes;

/// Bytes which may be absent.
///
/// A store returns [`None`] for a key that has never been set.
/// The array layer turns an absent chunk into fill value data rather than an error.
pub type MaybeBytes = Option<Bytes>;

/// The keys and child prefixes directly under a prefix.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct StoreKeysPrefixes {
    keys: StoreKeys,
    prefixes: StorePrefixes,
}

impl StoreKeysPrefixes {
    /// Create a new [`StoreKeysPrefixes`].
    #[must_use]
    pub fn new(keys: StoreKeys, prefixes: StorePrefixes) -> Self {
        Self { keys, prefixes }
    }

    /// Returns the keys.
    #[must_use]
    pub const fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// Returns the prefixes.
    #[must_use]
    pub const fn prefixes(&self) -> &StorePrefixes {
        &self.prefixes
    }
}

/// A storage error.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// An error parsing the metadata for a key.
    #[error("error parsing metadata for {0}: {1}")]
    InvalidMetadata(StoreKey, String),
    /// An invalid store prefix.
    #[error(transparent)]
    StorePrefixError(#[from] StorePrefixError),
    /// An invalid store key.
    #[error(transparent)]
    InvalidStoreKey(#[from] StoreKeyError),
    /// Any other error.
    #[error("{0}")]
    Other(String),
}
