use zarrv2_storage::{ReadableStorageTraits, StorageError, WritableStorageTraits};

use super::{num_elements, Array, ArrayError, ArrayOptions, ArrayValue, Element};
use crate::{indexer::ArraySelection, node::meta_key_array};

impl<TStorage: ?Sized + ReadableStorageTraits + WritableStorageTraits + 'static> Array<TStorage> {
    /// Write the array metadata to the `.zarray` key of the store.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if there is an underlying store error.
    pub fn store_metadata(&self) -> Result<(), StorageError> {
        let key = meta_key_array(&self.path)?;
        let metadata = serde_json::to_vec_pretty(&self.metadata())
            .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))?;
        self.storage.set(&key, metadata.into())
    }

    /// Encode `elements` and store them as the chunk at `chunk_coords`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the array is read only,
    ///  - the element type does not match the data type,
    ///  - `chunk_coords` are outside the chunk grid,
    ///  - the number of elements does not match the chunk shape, or
    ///  - there is a codec or storage error.
    pub fn store_chunk_elements<T: Element>(
        &self,
        chunk_coords: &[u64],
        elements: &[T],
    ) -> Result<(), ArrayError> {
        if self.read_only {
            return Err(ArrayError::ReadOnly);
        }
        let state = self.current_state()?;
        T::validate_data_type(state.data_type)?;
        state.validate_chunk_coords(chunk_coords)?;
        let expected = num_elements(&state.chunk_shape);
        if elements.len() as u64 != expected {
            return Err(ArrayError::InvalidElementCount {
                shape: state.chunk_shape.clone(),
                expected,
                got: elements.len() as u64,
            });
        }
        let key = state.chunk_key(&self.path, chunk_coords)?;
        self.chunk_storage.set(&key, state.encode_chunk(elements)?)?;
        Ok(())
    }

    /// Erase the chunk at `chunk_coords`, so that it reads as the fill value.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if the array is read only, `chunk_coords` are outside the chunk grid, or there is a storage error.
    pub fn erase_chunk(&self, chunk_coords: &[u64]) -> Result<(), ArrayError> {
        if self.read_only {
            return Err(ArrayError::ReadOnly);
        }
        let state = self.current_state()?;
        state.validate_chunk_coords(chunk_coords)?;
        self.chunk_storage
            .erase(&state.chunk_key(&self.path, chunk_coords)?)?;
        Ok(())
    }

    /// Write a scalar, [`NestedArray`](super::NestedArray), or [`RawArray`](super::RawArray) to a selection of the array.
    ///
    /// A scalar is written to every selected element.
    /// An array value must have the shape of the selection after integer-indexed dimensions are squeezed.
    ///
    /// Chunks entirely covered by the selection are overwritten without being read.
    /// Other chunks are read (or synthesised from the fill value if missing), updated, and written back.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if
    ///  - the array is read only,
    ///  - the element type does not match the data type,
    ///  - the selection is invalid,
    ///  - the value shape does not match the selection,
    ///  - a chunk cannot be decoded or encoded, or
    ///  - there is a storage error.
    pub fn set<T: Element>(
        &self,
        selection: impl Into<ArraySelection>,
        value: impl Into<ArrayValue<T>>,
    ) -> Result<(), ArrayError> {
        self.set_opt(selection, value, &ArrayOptions::default())
    }

    /// Explicit options version of [`set`](Array::set).
    #[allow(clippy::missing_errors_doc)]
    pub fn set_opt<T: Element>(
        &self,
        selection: impl Into<ArraySelection>,
        value: impl Into<ArrayValue<T>>,
        options: &ArrayOptions,
    ) -> Result<(), ArrayError> {
        if self.read_only {
            return Err(ArrayError::ReadOnly);
        }
        let state = self.current_state()?;
        T::validate_data_type(state.data_type)?;
        let indexer = state.indexer(&selection.into())?;
        let value = value.into();
        state.validate_value(&indexer, &value)?;

        let queue_size = indexer.num_chunks();
        options.progress(0, queue_size);
        for (progress, projection) in indexer.iter().enumerate() {
            let key = state.chunk_key(&self.path, &projection.chunk_coords)?;
            let chunk = if state.is_total_chunk(&projection) {
                log::debug!("overwriting chunk {key}");
                state.new_chunk(&projection, &value)?
            } else {
                log::debug!("updating chunk {key}");
                let mut chunk = match self.chunk_storage.get(&key)? {
                    Some(encoded) => state.decode_chunk(&encoded)?,
                    None => state.fill_chunk(),
                };
                state.patch_chunk(&mut chunk, &projection, &value)?;
                chunk
            };
            self.chunk_storage.set(&key, state.encode_chunk(&chunk)?)?;
            options.progress(progress + 1, queue_size);
        }
        Ok(())
    }
}
