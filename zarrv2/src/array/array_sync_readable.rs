use std::sync::Arc;

use zarrv2_storage::{Bytes, ListableStorageTraits, ReadableStorageTraits, StorageError};

use super::{
    chunk_key_encoding::is_chunk_key_name, num_elements, Array, ArrayCreateError, ArrayError,
    ArrayMetadataV2, ArrayOpenOptions, ArrayOptions, ArrayOrScalar, ArrayState, Element,
    NestedArray, RawArray,
};
use crate::{
    indexer::{ArraySelection, BasicIndexer},
    node::{contains_group, meta_key_array, NodePath},
};

/// Read the array metadata of the array at `path`.
pub(crate) fn retrieve_metadata<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<ArrayMetadataV2, ArrayCreateError> {
    let key = meta_key_array(path)?;
    match storage.get(&key)? {
        Some(metadata) => Ok(serde_json::from_slice(&metadata)
            .map_err(|err| StorageError::InvalidMetadata(key, err.to_string()))?),
        None if contains_group(storage, path)? => Err(ArrayCreateError::ContainsGroup(path.name())),
        None => Err(ArrayCreateError::MissingMetadata),
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits + 'static> Array<TStorage> {
    /// Open an existing array in `storage` at `path`.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if there is a storage error or the metadata is missing, invalid, or unsupported.
    pub fn open(storage: Arc<TStorage>, path: &str) -> Result<Self, ArrayCreateError> {
        Self::open_opt(storage, path, ArrayOpenOptions::default())
    }

    /// Open an existing array in `storage` at `path` with non-default [`ArrayOpenOptions`].
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if there is a storage error or the metadata is missing, invalid, or unsupported.
    pub fn open_opt(
        storage: Arc<TStorage>,
        path: &str,
        options: ArrayOpenOptions<TStorage>,
    ) -> Result<Self, ArrayCreateError> {
        let metadata = retrieve_metadata(&*storage, &NodePath::new(path)?)?;
        Self::new_with_metadata(storage, path, metadata, options)
    }

    /// Read the array metadata from the store again.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if there is a storage error or the metadata is missing, invalid, or unsupported.
    pub fn reload_metadata(&self) -> Result<(), ArrayCreateError> {
        let metadata = retrieve_metadata(&*self.storage, &self.path)?;
        self.replace_state(ArrayState::new(metadata)?);
        Ok(())
    }

    /// The array state for a data access, reloaded from the store unless metadata is cached.
    pub(super) fn current_state(&self) -> Result<Arc<ArrayState>, ArrayError> {
        if !self.cache_metadata {
            self.reload_metadata()?;
        }
        Ok(self.state())
    }

    /// Read the encoded bytes of the chunk at `chunk_coords`.
    ///
    /// Returns [`None`] if the chunk does not exist.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `chunk_coords` are outside the chunk grid or there is a storage error.
    pub fn retrieve_encoded_chunk(&self, chunk_coords: &[u64]) -> Result<Option<Bytes>, ArrayError> {
        let state = self.current_state()?;
        state.validate_chunk_coords(chunk_coords)?;
        Ok(self
            .chunk_storage
            .get(&state.chunk_key(&self.path, chunk_coords)?)?)
    }

    fn retrieve_chunk_elements<T: Element>(
        &self,
        state: &ArrayState,
        chunk_coords: &[u64],
    ) -> Result<Option<Vec<T>>, ArrayError> {
        let key = state.chunk_key(&self.path, chunk_coords)?;
        match self.chunk_storage.get(&key)? {
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

    /// Read and decode the chunk at `chunk_coords` into a vector of its elements if it exists.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the element type does not match the data type,
    ///  - `chunk_coords` are outside the chunk grid,
    ///  - the chunk cannot be decoded, or
    ///  - there is a storage error.
    pub fn retrieve_chunk_elements_if_exists<T: Element>(
        &self,
        chunk_coords: &[u64],
    ) -> Result<Option<Vec<T>>, ArrayError> {
        let state = self.current_state()?;
        T::validate_data_type(state.data_type)?;
        state.validate_chunk_coords(chunk_coords)?;
        self.retrieve_chunk_elements(&state, chunk_coords)
    }

    /// Read and decode the full chunk at `chunk_coords`.
    ///
    /// A chunk that does not exist is filled with the fill value, or zeros if the fill value is null.
    ///
    /// # Errors
    /// See [`retrieve_chunk_elements_if_exists`](Array::retrieve_chunk_elements_if_exists).
    pub fn get_raw_chunk<T: Element>(&self, chunk_coords: &[u64]) -> Result<RawArray<T>, ArrayError> {
        let state = self.current_state()?;
        T::validate_data_type(state.data_type)?;
        state.validate_chunk_coords(chunk_coords)?;
        let elements = self
            .retrieve_chunk_elements(&state, chunk_coords)?
            .unwrap_or_else(|| state.fill_chunk());
        RawArray::new(elements, state.chunk_shape.clone())
    }

    /// Read a selection of the array into a [`NestedArray`].
    ///
    /// Dimensions selected with an integer are squeezed, and a selection that squeezes every dimension returns a scalar.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the element type does not match the data type,
    ///  - the selection is invalid,
    ///  - a chunk cannot be decoded, or
    ///  - there is a storage error.
    pub fn get<T: Element>(
        &self,
        selection: impl Into<ArraySelection>,
    ) -> Result<ArrayOrScalar<NestedArray<T>, T>, ArrayError> {
        self.get_opt(selection, &ArrayOptions::default())
    }

    /// Explicit options version of [`get`](Array::get).
    #[allow(clippy::missing_errors_doc)]
    pub fn get_opt<T: Element>(
        &self,
        selection: impl Into<ArraySelection>,
        options: &ArrayOptions,
    ) -> Result<ArrayOrScalar<NestedArray<T>, T>, ArrayError> {
        let state = self.current_state()?;
        T::validate_data_type(state.data_type)?;
        let indexer = state.indexer(&selection.into())?;
        if indexer.output_shape().is_empty() {
            let out = self.retrieve_raw(&state, &indexer, options)?;
            return Ok(ArrayOrScalar::Scalar(out.data()[0]));
        }

        let mut out = NestedArray::zeros(indexer.output_shape().to_vec());
        let queue_size = indexer.num_chunks();
        options.progress(0, queue_size);
        for (progress, projection) in indexer.iter().enumerate() {
            let chunk = self.retrieve_chunk_elements(&state, &projection.chunk_coords)?;
            state.copy_chunk_to_nested(&mut out, &projection, chunk)?;
            options.progress(progress + 1, queue_size);
        }
        Ok(ArrayOrScalar::Array(out))
    }

    /// Read a selection of the array into a [`RawArray`].
    ///
    /// Dimensions selected with an integer are squeezed, and a selection that squeezes every dimension returns a scalar.
    ///
    /// # Errors
    /// See [`get`](Array::get).
    pub fn get_raw<T: Element>(
        &self,
        selection: impl Into<ArraySelection>,
    ) -> Result<ArrayOrScalar<RawArray<T>, T>, ArrayError> {
        self.get_raw_opt(selection, &ArrayOptions::default())
    }

    /// Explicit options version of [`get_raw`](Array::get_raw).
    #[allow(clippy::missing_errors_doc)]
    pub fn get_raw_opt<T: Element>(
        &self,
        selection: impl Into<ArraySelection>,
        options: &ArrayOptions,
    ) -> Result<ArrayOrScalar<RawArray<T>, T>, ArrayError> {
        let state = self.current_state()?;
        T::validate_data_type(state.data_type)?;
        let indexer = state.indexer(&selection.into())?;
        let out = self.retrieve_raw(&state, &indexer, options)?;
        if indexer.output_shape().is_empty() {
            Ok(ArrayOrScalar::Scalar(out.data()[0]))
        } else {
            Ok(ArrayOrScalar::Array(out))
        }
    }

    fn retrieve_raw<T: Element>(
        &self,
        state: &ArrayState,
        indexer: &BasicIndexer,
        options: &ArrayOptions,
    ) -> Result<RawArray<T>, ArrayError> {
        let mut out = RawArray::zeros(indexer.output_shape().to_vec());
        let queue_size = indexer.num_chunks();
        options.progress(0, queue_size);
        for (progress, projection) in indexer.iter().enumerate() {
            let chunk = self.retrieve_chunk_elements(state, &projection.chunk_coords)?;
            state.copy_chunk_to_raw(&mut out, &projection, chunk);
            options.progress(progress + 1, queue_size);
        }
        Ok(out)
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits + ListableStorageTraits + 'static> Array<TStorage> {
    /// The number of chunks that exist in the chunk store.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store cannot be listed.
    pub fn nchunks_initialized(&self) -> Result<u64, StorageError> {
        let prefix = self.path.to_prefix();
        let keys = self.chunk_storage.list_prefix(&prefix)?;
        let count = keys
            .iter()
            .filter_map(|key| key.as_str().strip_prefix(prefix.as_str()))
            .filter(|name| is_chunk_key_name(name))
            .count();
        Ok(count as u64)
    }

    /// Returns true if every chunk of the array exists in the chunk store.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the store cannot be listed.
    pub fn is_initialized(&self) -> Result<bool, StorageError> {
        Ok(self.nchunks_initialized()? == num_elements(&self.chunk_grid_shape()))
    }
}
