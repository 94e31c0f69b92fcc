use std::pin::pin;

use futures::{StreamExt, TryStreamExt};
use zarrv2_storage::{AsyncReadableStorageTraits, AsyncWritableStorageTraits, StorageError};

use super::{Array, ArrayError, ArrayOptions, ArrayState, ArrayValue, Element};
use crate::{
    indexer::{ArraySelection, ChunkProjection},
    node::meta_key_array,
};

impl<TStorage: ?Sized + AsyncReadableStorageTraits + AsyncWritableStorageTraits + 'static>
    Array<TStorage>
{
    /// Async variant of [`store_metadata`](Array::store_metadata).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_store_metadata(&self) -> Result<(), StorageError> {
        let key = meta_key_array(&self.path)?;
        let metadata = serde_json::to_vec_pretty(&self.metadata())
            .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))?;
        self.storage.set(&key, metadata.into()).await
    }

    /// Async variant of [`erase_chunk`](Array::erase_chunk).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_erase_chunk(&self, chunk_coords: &[u64]) -> Result<(), ArrayError> {
        if self.read_only {
            return Err(ArrayError::ReadOnly);
        }
        let state = self.async_current_state().await?;
        state.validate_chunk_coords(chunk_coords)?;
        self.chunk_storage
            .erase(&state.chunk_key(&self.path, chunk_coords)?)
            .await?;
        Ok(())
    }

    /// Async variant of [`set`](Array::set).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_set<T: Element>(
        &self,
        selection: impl Into<ArraySelection>,
        value: impl Into<ArrayValue<T>>,
    ) -> Result<(), ArrayError> {
        self.async_set_opt(selection, value, &ArrayOptions::default())
            .await
    }

    /// Async variant of [`set_opt`](Array::set_opt).
    ///
    /// Up to [`ArrayOptions::concurrent_target`] chunks are updated concurrently.
    /// Progress counts completed chunks, which may complete in any order.
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_set_opt<T: Element>(
        &self,
        selection: impl Into<ArraySelection>,
        value: impl Into<ArrayValue<T>>,
        options: &ArrayOptions,
    ) -> Result<(), ArrayError> {
        if self.read_only {
            return Err(ArrayError::ReadOnly);
        }
        let state = self.async_current_state().await?;
        T::validate_data_type(state.data_type)?;
        let indexer = state.indexer(&selection.into())?;
        let value = value.into();
        state.validate_value(&indexer, &value)?;

        let queue_size = indexer.num_chunks();
        options.progress(0, queue_size);
        let (state, value) = (&*state, &value);
        let mut stored = pin!(futures::stream::iter(indexer.iter())
            .map(|projection| self.async_store_projection(state, projection, value))
            .buffer_unordered(options.concurrent_target()));
        let mut progress = 0;
        while stored.try_next().await?.is_some() {
            progress += 1;
            options.progress(progress, queue_size);
        }
        Ok(())
    }

    async fn async_store_projection<T: Element>(
        &self,
        state: &ArrayState,
        projection: ChunkProjection,
        value: &ArrayValue<T>,
    ) -> Result<(), ArrayError> {
        let key = state.chunk_key(&self.path, &projection.chunk_coords)?;
        let chunk = if state.is_total_chunk(&projection) {
            log::debug!("overwriting chunk {key}");
            state.new_chunk(&projection, value)?
        } else {
            log::debug!("updating chunk {key}");
            let mut chunk = match self.chunk_storage.get(&key).await? {
                Some(encoded) => state.decode_chunk(&encoded)?,
                None => state.fill_chunk(),
            };
            state.patch_chunk(&mut chunk, &projection, value)?;
            chunk
        };
        self.chunk_storage
            .set(&key, state.encode_chunk(&chunk)?)
            .await?;
        Ok(())
    }
}
