use std::pin::pin;
use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use zarrv2_storage::{AsyncReadableStorageTraits, Bytes, StorageError};

use super::{
    Array, ArrayCreateError, ArrayError, ArrayMetadataV2, ArrayOpenOptions, ArrayOptions,
    ArrayOrScalar, ArrayState, Element, NestedArray, RawArray,
};
use crate::{
    indexer::{ArraySelection, BasicIndexer, ChunkProjection},
    node::{meta_key_array, meta_key_group, NodePath},
};

async fn async_retrieve_metadata<TStorage: ?Sized + AsyncReadableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<ArrayMetadataV2, ArrayCreateError> {
    let key = meta_key_array(path)?;
    match storage.get(&key).await? {
        Some(metadata) => Ok(serde_json::from_slice(&metadata)
            .map_err(|err| StorageError::InvalidMetadata(key, err.to_string()))?),
        None if storage.contains_key(&meta_key_group(path)?).await? => {
            Err(ArrayCreateError::ContainsGroup(path.name()))
        }
        None => Err(ArrayCreateError::MissingMetadata),
    }
}

impl<TStorage: ?Sized + AsyncReadableStorageTraits + 'static> Array<TStorage> {
    /// Async variant of [`open`](Array::open).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_open(storage: Arc<TStorage>, path: &str) -> Result<Self, ArrayCreateError> {
        Self::async_open_opt(storage, path, ArrayOpenOptions::default()).await
    }

    /// Async variant of [`open_opt`](Array::open_opt).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_open_opt(
        storage: Arc<TStorage>,
        path: &str,
        options: ArrayOpenOptions<TStorage>,
    ) -> Result<Self, ArrayCreateError> {
        let metadata = async_retrieve_metadata(&*storage, &NodePath::new(path)?).await?;
        Self::new_with_metadata(storage, path, metadata, options)
    }

    /// Async variant of [`reload_metadata`](Array::reload_metadata).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_reload_metadata(&self) -> Result<(), ArrayCreateError> {
        let metadata = async_retrieve_metadata(&*self.storage, &self.path).await?;
        self.replace_state(ArrayState::new(metadata)?);
        Ok(())
    }

    pub(super) async fn async_current_state(&self) -> Result<Arc<ArrayState>, ArrayError> {
        if !self.cache_metadata {
            self.async_reload_metadata().await?;
        }
        Ok(self.state())
    }

    /// Async variant of [`retrieve_encoded_chunk`](Array::retrieve_encoded_chunk).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_retrieve_encoded_chunk(
        &self,
        chunk_coords: &[u64],
    ) -> Result<Option<Bytes>, ArrayError> {
        let state = self.async_current_state().await?;
        state.validate_chunk_coords(chunk_coords)?;
        Ok(self
            .chunk_storage
            .get(&state.chunk_key(&self.path, chunk_coords)?)
            .await?)
    }

    async fn async_retrieve_chunk_elements<T: Element>(
        &self,
        state: &ArrayState,
        chunk_coords: &[u64],
    ) -> Result<Option<Vec<T>>, ArrayError> {
        let key = state.chunk_key(&self.path, chunk_coords)?;
        match self.chunk_storage.get(&key).await? {
            Some(encoded) => {
                log::debug!("decoding chunk {key}");
                Ok(Some(state.decode_chunk(&encoded)?))
            }
            None => {
                log::debug!("chunk {key} is missing, using the fill value");
                Ok(None)
            }
        }
    }

    /// Async variant of [`retrieve_chunk_elements_if_exists`](Array::retrieve_chunk_elements_if_exists).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_retrieve_chunk_elements_if_exists<T: Element>(
        &self,
        chunk_coords: &[u64],
    ) -> Result<Option<Vec<T>>, ArrayError> {
        let state = self.async_current_state().await?;
        T::validate_data_type(state.data_type)?;
        state.validate_chunk_coords(chunk_coords)?;
        self.async_retrieve_chunk_elements(&state, chunk_coords).await
    }

    /// Async variant of [`get_raw_chunk`](Array::get_raw_chunk).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_get_raw_chunk<T: Element>(
        &self,
        chunk_coords: &[u64],
    ) -> Result<RawArray<T>, ArrayError> {
        let state = self.async_current_state().await?;
        T::validate_data_type(state.data_type)?;
        state.validate_chunk_coords(chunk_coords)?;
        let elements = self
            .async_retrieve_chunk_elements(&state, chunk_coords)
            .await?
            .unwrap_or_else(|| state.fill_chunk());
        RawArray::new(elements, state.chunk_shape.clone())
    }

    /// Async variant of [`get`](Array::get).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_get<T: Element>(
        &self,
        selection: impl Into<ArraySelection>,
    ) -> Result<ArrayOrScalar<NestedArray<T>, T>, ArrayError> {
        self.async_get_opt(selection, &ArrayOptions::default()).await
    }

    /// Async variant of [`get_opt`](Array::get_opt).
    ///
    /// Up to [`ArrayOptions::concurrent_target`] chunks are retrieved concurrently.
    /// Progress counts completed chunks, which may complete in any order.
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_get_opt<T: Element>(
        &self,
        selection: impl Into<ArraySelection>,
        options: &ArrayOptions,
    ) -> Result<ArrayOrScalar<NestedArray<T>, T>, ArrayError> {
        let state = self.async_current_state().await?;
        T::validate_data_type(state.data_type)?;
        let indexer = state.indexer(&selection.into())?;
        if indexer.output_shape().is_empty() {
            let out = self.async_retrieve_raw(&state, &indexer, options).await?;
            return Ok(ArrayOrScalar::Scalar(out.data()[0]));
        }

        let mut out = NestedArray::zeros(indexer.output_shape().to_vec());
        let queue_size = indexer.num_chunks();
        options.progress(0, queue_size);
        let mut chunks = pin!(self.async_retrieve_chunks::<T>(&state, &indexer, options));
        let mut progress = 0;
        while let Some((projection, chunk)) = chunks.try_next().await? {
            state.copy_chunk_to_nested(&mut out, &projection, chunk)?;
            progress += 1;
            options.progress(progress, queue_size);
        }
        Ok(ArrayOrScalar::Array(out))
    }

    /// Async variant of [`get_raw`](Array::get_raw).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_get_raw<T: Element>(
        &self,
        selection: impl Into<ArraySelection>,
    ) -> Result<ArrayOrScalar<RawArray<T>, T>, ArrayError> {
        self.async_get_raw_opt(selection, &ArrayOptions::default())
            .await
    }

    /// Async variant of [`get_raw_opt`](Array::get_raw_opt).
    #[allow(clippy::missing_errors_doc)]
    pub async fn async_get_raw_opt<T: Element>(
        &self,
        selection: impl Into<ArraySelection>,
        options: &ArrayOptions,
    ) -> Result<ArrayOrScalar<RawArray<T>, T>, ArrayError> {
        let state = self.async_current_state().await?;
        T::validate_data_type(state.data_type)?;
        let indexer = state.indexer(&selection.into())?;
        let out = self.async_retrieve_raw(&state, &indexer, options).await?;
        if indexer.output_shape().is_empty() {
            Ok(ArrayOrScalar::Scalar(out.data()[0]))
        } else {
            Ok(ArrayOrScalar::Array(out))
        }
    }

    async fn async_retrieve_raw<T: Element>(
        &self,
        state: &ArrayState,
        indexer: &BasicIndexer,
        options: &ArrayOptions,
    ) -> Result<RawArray<T>, ArrayError> {
        let mut out = RawArray::zeros(indexer.output_shape().to_vec());
        let queue_size = indexer.num_chunks();
        options.progress(0, queue_size);
        let mut chunks = pin!(self.async_retrieve_chunks::<T>(state, indexer, options));
        let mut progress = 0;
        while let Some((projection, chunk)) = chunks.try_next().await? {
            state.copy_chunk_to_raw(&mut out, &projection, chunk);
            progress += 1;
            options.progress(progress, queue_size);
        }
        Ok(out)
    }

    /// A stream of the chunks of `indexer` in completion order, with at most the concurrent target in flight.
    fn async_retrieve_chunks<'a, T: Element>(
        &'a self,
        state: &'a ArrayState,
        indexer: &'a BasicIndexer,
        options: &ArrayOptions,
    ) -> impl futures::Stream<Item = Result<(ChunkProjection, Option<Vec<T>>), ArrayError>> + 'a
    {
        futures::stream::iter(indexer.iter())
            .map(move |projection| async move {
                let chunk = self
                    .async_retrieve_chunk_elements(state, &projection.chunk_coords)
                    .await?;
                Ok::<_, ArrayError>((projection, chunk))
            })
            .buffer_unordered(options.concurrent_target())
    }
}
