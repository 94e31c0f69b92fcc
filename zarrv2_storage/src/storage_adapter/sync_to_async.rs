//! Exposes a synchronous store through the asynchronous storage traits.

use std::sync::Arc;

use crate::{
    AsyncListableStorageTraits, AsyncReadableStorageTraits, AsyncWritableStorageTraits, Bytes,
    ListableStorageTraits, MaybeBytes, MaybeSend, MaybeSync, ReadableStorageTraits,
    StorageError, StoreKey, StoreKeys, StoreKeysPrefixes, StorePrefix, WritableStorageTraits,
};

/// Runs blocking work on an asynchronous runtime.
///
/// ### Example `tokio` implementation
/// ```rust,ignore
/// struct TokioSpawnBlocking;
///
/// impl SyncToAsyncSpawnBlocking for TokioSpawnBlocking {
///     fn spawn_blocking<F, R>(&self, f: F) -> impl std::future::Future<Output = R> + Send
///     where
///         F: FnOnce() -> R + Send + 'static,
///         R: Send + 'static,
///     {
///         async move { tokio::task::spawn_blocking(f).await.unwrap() }
///     }
/// }
/// ```
pub trait SyncToAsyncSpawnBlocking: MaybeSend + MaybeSync {
    /// Spawns a blocking task.
    fn spawn_blocking<F, R>(&self, f: F) -> impl std::future::Future<Output = R> + MaybeSend
    where
        F: FnOnce() -> R + MaybeSend + 'static,
        R: MaybeSend + 'static;
}

/// A sync to async storage adapter.
pub struct SyncToAsyncStorageAdapter<TStorage: ?Sized, TSpawnBlocking: SyncToAsyncSpawnBlocking> {
    storage: Arc<TStorage>,
    spawn_blocking: TSpawnBlocking,
}

impl<TStorage: ?Sized, TSpawnBlocking: SyncToAsyncSpawnBlocking>
    SyncToAsyncStorageAdapter<TStorage, TSpawnBlocking>
{
    /// Create a new sync to async storage adapter.
    #[must_use]
    pub fn new(storage: Arc<TStorage>, spawn_blocking: TSpawnBlocking) -> Self {
        Self {
            storage,
            spawn_blocking,
        }
    }

    async fn run<F, R>(&self, f: F) -> R
    where
        F: FnOnce(Arc<TStorage>) -> R + MaybeSend + 'static,
        R: MaybeSend + 'static,
        TStorage: MaybeSend + MaybeSync + 'static,
    {
        let storage = self.storage.clone();
        self.spawn_blocking.spawn_blocking(move || f(storage)).await
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl<TStorage, TSpawnBlocking> AsyncReadableStorageTraits
    for SyncToAsyncStorageAdapter<TStorage, TSpawnBlocking>
where
    TStorage: ?Sized + ReadableStorageTraits + 'static,
    TSpawnBlocking: SyncToAsyncSpawnBlocking,
{
    async fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        let key = key.clone();
        self.run(move |storage| storage.get(&key)).await
    }

    async fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        let key = key.clone();
        self.run(move |storage| storage.size_key(&key)).await
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl<TStorage, TSpawnBlocking> AsyncWritableStorageTraits
    for SyncToAsyncStorageAdapter<TStorage, TSpawnBlocking>
where
    TStorage: ?Sized + WritableStorageTraits + 'static,
    TSpawnBlocking: SyncToAsyncSpawnBlocking,
{
    async fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        let key = key.clone();
        self.run(move |storage| storage.set(&key, value)).await
    }

    async fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        let key = key.clone();
        self.run(move |storage| storage.erase(&key)).await
    }

    async fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        let prefix = prefix.clone();
        self.run(move |storage| storage.erase_prefix(&prefix)).await
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl<TStorage, TSpawnBlocking> AsyncListableStorageTraits
    for SyncToAsyncStorageAdapter<TStorage, TSpawnBlocking>
where
    TStorage: ?Sized + ListableStorageTraits + 'static,
    TSpawnBlocking: SyncToAsyncSpawnBlocking,
{
    async fn list(&self) -> Result<StoreKeys, StorageError> {
        self.run(|storage| storage.list()).await
    }

    async fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        let prefix = prefix.clone();
        self.run(move |storage| storage.list_prefix(&prefix)).await
    }

    async fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let prefix = prefix.clone();
        self.run(move |storage| storage.list_dir(&prefix)).await
    }
}
