#![allow(missing_docs)]
#![cfg(feature = "async")]

use std::sync::Arc;

use zarrv2_storage::storage_adapter::sync_to_async::{
    SyncToAsyncSpawnBlocking, SyncToAsyncStorageAdapter,
};
use zarrv2_storage::store::MemoryStore;
use zarrv2_storage::{
    AsyncListableStorageTraits, AsyncReadableStorageTraits, AsyncWritableStorageTraits, Bytes,
    StoreKey, StorePrefix,
};

struct TokioSpawnBlocking;

impl SyncToAsyncSpawnBlocking for TokioSpawnBlocking {
    fn spawn_blocking<F, R>(&self, f: F) -> impl std::future::Future<Output = R> + Send
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        async move { tokio::task::spawn_blocking(f).await.unwrap() }
    }
}

#[tokio::test]
async fn sync_to_async_memory_store() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let store = SyncToAsyncStorageAdapter::new(store, TokioSpawnBlocking);

    let key = StoreKey::new("array/0.0")?;
    assert_eq!(store.get(&key).await?, None);
    assert!(!store.contains_key(&key).await?);
    store.set(&key, Bytes::from_static(&[1, 2, 3])).await?;
    assert_eq!(store.get(&key).await?.as_deref(), Some([1u8, 2, 3].as_slice()));
    assert_eq!(store.size_key(&key).await?, Some(3));
    assert_eq!(store.list().await?, vec![key.clone()]);
    assert_eq!(
        store.list_dir(&StorePrefix::root()).await?.prefixes(),
        &[StorePrefix::new("array/")?]
    );
    store.erase_prefix(&StorePrefix::new("array/")?).await?;
    assert!(store.list_prefix(&StorePrefix::root()).await?.is_empty());
    Ok(())
}
