#![allow(missing_docs)]
#![cfg(feature = "async")]

use std::sync::{Arc, Mutex};

use zarrv2::array::{Array, ArrayBuilder, ArrayError, ArrayOptions, DataType, NestedArray};
use zarrv2::indexer::{ArraySelection, Selector, Slice};
use zarrv2::storage::storage_adapter::sync_to_async::{
    SyncToAsyncSpawnBlocking, SyncToAsyncStorageAdapter,
};
use zarrv2::storage::store::MemoryStore;

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

type AsyncMemoryStore = SyncToAsyncStorageAdapter<MemoryStore, TokioSpawnBlocking>;

fn async_store() -> Arc<AsyncMemoryStore> {
    Arc::new(SyncToAsyncStorageAdapter::new(
        Arc::new(MemoryStore::new()),
        TokioSpawnBlocking,
    ))
}

#[tokio::test(flavor = "multi_thread")]
async fn array_async_write_read() -> Result<(), Box<dyn std::error::Error>> {
    let store = async_store();
    let array = ArrayBuilder::new(vec![6, 6], DataType::UInt16)
        .chunk_shape(vec![4, 4])
        .fill_value(9i64)
        .build(store.clone(), "/array")?;
    array.async_store_metadata().await?;

    let updates = Arc::new(Mutex::new(Vec::new()));
    let options = ArrayOptions::default()
        .with_concurrent_target(2)
        .with_progress_callback({
            let updates = updates.clone();
            move |update| updates.lock().unwrap().push(update.progress)
        });
    array
        .async_set_opt(
            [Selector::Range(Slice::range(1, 5)?), Selector::Full],
            NestedArray::from_flat((0..24).collect(), vec![4, 6])?,
            &options,
        )
        .await?;
    assert_eq!(*updates.lock().unwrap(), vec![0, 1, 2, 3, 4]);

    let array = Array::async_open(store, "array").await?;
    let column = array
        .async_get::<u16>([Selector::Full, Selector::Index(1)])
        .await?
        .array()
        .unwrap();
    assert_eq!(column.flatten(), vec![9, 1, 7, 13, 19, 9]);

    updates.lock().unwrap().clear();
    let all = array
        .async_get_raw_opt::<u16>(ArraySelection::all(), &options)
        .await?
        .array()
        .unwrap();
    assert_eq!(&all.data()[6..12], &[0, 1, 2, 3, 4, 5]);
    assert_eq!(*updates.lock().unwrap(), vec![0, 1, 2, 3, 4]);

    assert_eq!(
        array
            .async_get::<u16>([Selector::Index(4), Selector::Index(5)])
            .await?
            .scalar(),
        Some(23)
    );
    assert_eq!(array.async_get_raw_chunk::<u16>(&[1, 1]).await?.data()[0], 22);
    assert!(array
        .async_retrieve_chunk_elements_if_exists::<u16>(&[0, 0])
        .await?
        .is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn array_async_errors() -> Result<(), Box<dyn std::error::Error>> {
    let store = async_store();
    let mut builder = ArrayBuilder::new(vec![4], DataType::Int8);
    builder.read_only(true);
    let array = builder.build(store.clone(), "array")?;
    array.async_store_metadata().await?;
    assert!(matches!(
        array.async_set(ArraySelection::all(), 1i8).await,
        Err(ArrayError::ReadOnly)
    ));
    assert!(matches!(
        array.async_get::<u8>(ArraySelection::all()).await,
        Err(ArrayError::IncompatibleElementType { .. })
    ));
    assert!(Array::async_open(store, "missing").await.is_err());
    Ok(())
}
