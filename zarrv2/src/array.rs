//! Zarr V2 arrays.
//!
//! An [`Array`] is an N-dimensional array split into a regular grid of chunks.
//! Each chunk is encoded by the array compressor (if any) and stored under a key derived from its grid coordinates.
//! Array metadata (`.zarray`) holds the shape, chunk shape, data type, fill value, and compressor.
//!
//! Create an array with an [`ArrayBuilder`] or the helpers in [`crate::creation`], and open an existing array with [`Array::open`].
//!
//! Data is read and written through a selection, see [`crate::indexer`]:
//!  - [`Array::get`] returns a [`NestedArray`] (or a scalar if every dimension is indexed),
//!  - [`Array::get_raw`] returns a [`RawArray`], a flat buffer,
//!  - [`Array::get_raw_chunk`] returns one full decoded chunk,
//!  - [`Array::set`] writes a scalar, [`NestedArray`], or [`RawArray`].
//!
//! Chunks that have never been written read as the fill value, or zero if the fill value is null.
//!
//! With the `async` feature, equivalent methods prefixed with `async_` are available for asynchronous stores.

mod array_builder;
mod array_errors;
mod array_sync_readable;
mod array_sync_writable;
mod chunk_key_encoding;
pub mod codec;
mod data_type;
mod element;
mod fill_value;
mod nested_array;
mod options;
mod raw_array;

#[cfg(feature = "async")]
mod array_async_readable;
#[cfg(feature = "async")]
mod array_async_writable;

use std::borrow::Cow;
use std::sync::Arc;

use parking_lot::RwLock;
use zarrv2_storage::{Bytes, StorageError, StoreKey};

pub use array_builder::{init_array, ArrayBuilder};
pub(crate) use array_builder::{group_metadata_bytes, require_parent_groups, RequireGroupError};
pub use array_errors::{ArrayCreateError, ArrayError};
pub use chunk_key_encoding::chunk_key;
pub use data_type::{DataType, UnsupportedDataTypeError};
pub use element::Element;
pub use fill_value::{fill_value_from_metadata, fill_value_to_metadata, FillValue};
pub use nested_array::{NestedArray, NestedArrayData};
pub use options::{ArrayOptions, ProgressCallback, ProgressUpdate};
pub use raw_array::{c_order_strides, set_from_chunk_item, set_to_scalar, RawArray};
pub use zarrv2_metadata::{
    ArrayMetadataV2, ArrayMetadataV2Order, ArrayShape, ChunkKeySeparator, Endianness,
    FillValueMetadataV2,
};

pub(crate) use element::{elements_from_bytes, elements_to_bytes, swap_byte_order};

use crate::{
    attributes::Attributes,
    config::global_config,
    indexer::{is_total_slice, ArraySelection, BasicIndexer, ChunkProjection, DimSelection},
    node::{meta_key_attributes, NodePath},
};
use codec::{create_codec, Codec};

/// The result of a selection, an array or a scalar if every dimension was indexed with an integer.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayOrScalar<A, T> {
    /// An array.
    Array(A),
    /// A scalar.
    Scalar(T),
}

impl<A, T> ArrayOrScalar<A, T> {
    /// Returns the array, or [`None`] if this is a scalar.
    pub fn array(self) -> Option<A> {
        match self {
            Self::Array(array) => Some(array),
            Self::Scalar(_) => None,
        }
    }

    /// Returns the scalar, or [`None`] if this is an array.
    pub fn scalar(self) -> Option<T> {
        match self {
            Self::Array(_) => None,
            Self::Scalar(scalar) => Some(scalar),
        }
    }
}

/// A value written to a selection.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayValue<T> {
    /// A scalar broadcast to every selected element.
    Scalar(T),
    /// A nested array with the shape of the selection.
    Nested(NestedArray<T>),
    /// A raw array with the shape of the selection.
    Raw(RawArray<T>),
}

impl<T: Element> ArrayValue<T> {
    /// The shape of the value, or [`None`] for a scalar.
    #[must_use]
    pub fn shape(&self) -> Option<&[u64]> {
        match self {
            Self::Scalar(_) => None,
            Self::Nested(array) => Some(array.shape()),
            Self::Raw(array) => Some(array.shape()),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn array_index(index: u64) -> usize {
    index as usize
}

pub(crate) fn num_elements(shape: &[u64]) -> u64 {
    shape.iter().product()
}

/// Options for opening an array.
#[derive(Debug)]
pub struct ArrayOpenOptions<TStorage: ?Sized> {
    /// A separate store for chunks. Metadata and attributes stay in the array store.
    pub chunk_store: Option<Arc<TStorage>>,
    /// Reject writes to the array and its attributes.
    pub read_only: bool,
    /// Hold metadata for the lifetime of the array, otherwise it is reloaded before each data access.
    pub cache_metadata: bool,
    /// Hold attributes after the first read, otherwise they are reloaded on every read.
    pub cache_attrs: bool,
}

impl<TStorage: ?Sized> Default for ArrayOpenOptions<TStorage> {
    fn default() -> Self {
        Self {
            chunk_store: None,
            read_only: false,
            cache_metadata: true,
            cache_attrs: true,
        }
    }
}

impl<TStorage: ?Sized> Clone for ArrayOpenOptions<TStorage> {
    fn clone(&self) -> Self {
        Self {
            chunk_store: self.chunk_store.clone(),
            read_only: self.read_only,
            cache_metadata: self.cache_metadata,
            cache_attrs: self.cache_attrs,
        }
    }
}

/// Array metadata resolved for chunk encoding and decoding.
#[derive(Debug)]
pub(crate) struct ArrayState {
    metadata: ArrayMetadataV2,
    shape: ArrayShape,
    chunk_shape: ArrayShape,
    chunk_strides: Vec<usize>,
    data_type: DataType,
    endianness: Option<Endianness>,
    fill_value: Option<FillValue>,
    codec: Option<Codec>,
}

impl ArrayState {
    pub(crate) fn new(metadata: ArrayMetadataV2) -> Result<Self, ArrayCreateError> {
        if metadata.order != ArrayMetadataV2Order::C {
            return Err(ArrayCreateError::UnsupportedOrder);
        }
        if metadata
            .filters
            .as_ref()
            .is_some_and(|filters| !filters.is_empty())
        {
            return Err(ArrayCreateError::UnsupportedFilters);
        }
        let (data_type, endianness) = DataType::from_metadata(&metadata.dtype)?;
        if data_type == DataType::Float16 && !global_config().float16_support() {
            return Err(ArrayCreateError::Float16Unsupported);
        }
        let shape = metadata.shape.clone();
        let chunk_shape = metadata.chunks.to_array_shape();
        if chunk_shape.len() != shape.len() {
            return Err(ArrayCreateError::InvalidChunkDimensionality(
                chunk_shape.len(),
                shape.len(),
            ));
        }
        let fill_value = fill_value_from_metadata(data_type, &metadata.fill_value)?;
        let codec = metadata.compressor.as_ref().map(create_codec).transpose()?;
        Ok(Self {
            chunk_strides: c_order_strides(&chunk_shape),
            metadata,
            shape,
            chunk_shape,
            data_type,
            endianness,
            fill_value,
            codec,
        })
    }

    fn needs_byte_swap(&self) -> bool {
        self.data_type.size() > 1 && self.endianness.is_some_and(|endianness| !endianness.is_native())
    }

    fn chunk_num_elements(&self) -> u64 {
        num_elements(&self.chunk_shape)
    }

    pub(crate) fn chunk_grid_shape(&self) -> ArrayShape {
        std::iter::zip(&self.shape, &self.chunk_shape)
            .map(|(length, chunk_length)| length.div_ceil(*chunk_length))
            .collect()
    }

    pub(crate) fn chunk_key(
        &self,
        path: &NodePath,
        chunk_coords: &[u64],
    ) -> Result<StoreKey, StorageError> {
        Ok(chunk_key(
            path,
            chunk_coords,
            self.metadata.dimension_separator,
        )?)
    }

    pub(crate) fn indexer(&self, selection: &ArraySelection) -> Result<BasicIndexer, ArrayError> {
        Ok(BasicIndexer::new(selection, &self.shape, &self.chunk_shape)?)
    }

    pub(crate) fn validate_chunk_coords(&self, chunk_coords: &[u64]) -> Result<(), ArrayError> {
        let grid_shape = self.chunk_grid_shape();
        if chunk_coords.len() == grid_shape.len()
            && std::iter::zip(chunk_coords, &grid_shape).all(|(coord, length)| coord < length)
        {
            Ok(())
        } else {
            Err(ArrayError::InvalidChunkGridIndicesError(chunk_coords.to_vec()))
        }
    }

    pub(crate) fn validate_value<T: Element>(
        &self,
        indexer: &BasicIndexer,
        value: &ArrayValue<T>,
    ) -> Result<(), ArrayError> {
        match value.shape() {
            Some(shape) if shape != indexer.output_shape() => Err(ArrayError::InvalidDataShape {
                expected: indexer.output_shape().to_vec(),
                got: shape.to_vec(),
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn fill_element<T: Element>(&self) -> Option<T> {
        self.fill_value.as_ref().and_then(FillValue::to_element)
    }

    /// A chunk of the fill value, or zeros if the fill value is null.
    pub(crate) fn fill_chunk<T: Element>(&self) -> Vec<T> {
        vec![
            self.fill_element().unwrap_or_else(T::zeroed);
            array_index(self.chunk_num_elements())
        ]
    }

    pub(crate) fn decode_chunk<T: Element>(&self, encoded: &[u8]) -> Result<Vec<T>, ArrayError> {
        let decoded = match &self.codec {
            Some(codec) => codec.decode(Cow::Borrowed(encoded))?,
            None => Cow::Borrowed(encoded),
        };
        let expected = self.chunk_num_elements() * self.data_type.size() as u64;
        if decoded.len() as u64 != expected {
            return Err(ArrayError::UnexpectedChunkDecodedSize {
                expected,
                got: decoded.len() as u64,
            });
        }
        if self.needs_byte_swap() {
            let mut decoded = decoded.into_owned();
            swap_byte_order(&mut decoded, self.data_type.size());
            Ok(elements_from_bytes(&decoded))
        } else {
            Ok(elements_from_bytes(&decoded))
        }
    }

    pub(crate) fn encode_chunk<T: Element>(&self, elements: &[T]) -> Result<Bytes, ArrayError> {
        let mut bytes = Cow::Borrowed(elements_to_bytes(elements));
        if self.needs_byte_swap() {
            swap_byte_order(bytes.to_mut(), self.data_type.size());
        }
        let encoded = match &self.codec {
            Some(codec) => codec.encode(bytes)?,
            None => bytes,
        };
        Ok(Bytes::from(encoded.into_owned()))
    }

    /// Copy the selected region of a chunk into `out`, or the fill value if the chunk is missing.
    pub(crate) fn copy_chunk_to_nested<T: Element>(
        &self,
        out: &mut NestedArray<T>,
        projection: &ChunkProjection,
        chunk: Option<Vec<T>>,
    ) -> Result<(), ArrayError> {
        let out_selection = out_selection(projection);
        match chunk {
            Some(elements) => {
                let chunk = NestedArray::from_flat(elements, self.chunk_shape.clone())?;
                match chunk.get_selection(&projection.chunk_selection) {
                    ArrayOrScalar::Array(data) => out.set_selection(&out_selection, &data),
                    ArrayOrScalar::Scalar(value) => {
                        out.set_selection_scalar(&out_selection, value);
                    }
                }
            }
            None => {
                if let Some(fill_value) = self.fill_element::<T>() {
                    out.set_selection_scalar(&out_selection, fill_value);
                }
            }
        }
        Ok(())
    }

    /// Copy the selected region of a chunk into `out`, or the fill value if the chunk is missing.
    pub(crate) fn copy_chunk_to_raw<T: Element>(
        &self,
        out: &mut RawArray<T>,
        projection: &ChunkProjection,
        chunk: Option<Vec<T>>,
    ) {
        let out_selection = out_selection(projection);
        let (out_data, out_strides) = out.parts_mut();
        match chunk {
            Some(elements) => set_from_chunk_item(
                (out_data, out_strides, &out_selection),
                (elements.as_slice(), &self.chunk_strides, &projection.chunk_selection),
            ),
            None => {
                if let Some(fill_value) = self.fill_element::<T>() {
                    set_to_scalar(out_data, out_strides, &out_selection, fill_value);
                }
            }
        }
    }

    /// Returns true if the chunk of `projection` is entirely overwritten.
    pub(crate) fn is_total_chunk(&self, projection: &ChunkProjection) -> bool {
        is_total_slice(&projection.chunk_selection, &self.chunk_shape)
    }

    /// Write the part of `value` that falls in the chunk of `projection` into `chunk`.
    pub(crate) fn patch_chunk<T: Element>(
        &self,
        chunk: &mut Vec<T>,
        projection: &ChunkProjection,
        value: &ArrayValue<T>,
    ) -> Result<(), ArrayError> {
        let chunk_selection = &projection.chunk_selection;
        match value {
            ArrayValue::Scalar(value) => {
                set_to_scalar(chunk.as_mut_slice(), &self.chunk_strides, chunk_selection, *value);
            }
            ArrayValue::Raw(value) => set_from_chunk_item(
                (chunk.as_mut_slice(), &self.chunk_strides, chunk_selection),
                (value.data(), value.strides(), &out_selection(projection)),
            ),
            ArrayValue::Nested(value) => {
                let mut nested =
                    NestedArray::from_flat(std::mem::take(chunk), self.chunk_shape.clone())?;
                match value.get_selection(&out_selection(projection)) {
                    ArrayOrScalar::Array(data) => nested.set_selection(chunk_selection, &data),
                    ArrayOrScalar::Scalar(value) => {
                        nested.set_selection_scalar(chunk_selection, value);
                    }
                }
                *chunk = nested.flatten();
            }
        }
        Ok(())
    }

    /// Create a chunk entirely overwritten by `value` without reading it.
    pub(crate) fn new_chunk<T: Element>(
        &self,
        projection: &ChunkProjection,
        value: &ArrayValue<T>,
    ) -> Result<Vec<T>, ArrayError> {
        let num_elements = array_index(self.chunk_num_elements());
        if let ArrayValue::Scalar(value) = value {
            return Ok(vec![*value; num_elements]);
        }
        let mut chunk = vec![T::zeroed(); num_elements];
        self.patch_chunk(&mut chunk, projection, value)?;
        Ok(chunk)
    }
}

fn out_selection(projection: &ChunkProjection) -> Vec<DimSelection> {
    projection
        .out_selection
        .iter()
        .copied()
        .map(DimSelection::Slice)
        .collect()
}

/// A Zarr V2 array.
///
/// Methods requiring a store are implemented for `TStorage` with the relevant storage traits:
///  - reading: [`ReadableStorageTraits`](crate::storage::ReadableStorageTraits),
///  - writing: [`ReadableStorageTraits`](crate::storage::ReadableStorageTraits) + [`WritableStorageTraits`](crate::storage::WritableStorageTraits),
///  - counting initialised chunks: [`ListableStorageTraits`](crate::storage::ListableStorageTraits).
#[derive(Debug)]
pub struct Array<TStorage: ?Sized> {
    storage: Arc<TStorage>,
    chunk_storage: Arc<TStorage>,
    path: NodePath,
    read_only: bool,
    cache_metadata: bool,
    state: RwLock<Arc<ArrayState>>,
    attributes: Attributes<TStorage>,
}

impl<TStorage: ?Sized> Array<TStorage> {
    /// Create an array from metadata without touching the store.
    ///
    /// # Errors
    /// Returns an [`ArrayCreateError`] if the metadata is unsupported.
    pub fn new_with_metadata(
        storage: Arc<TStorage>,
        path: &str,
        metadata: ArrayMetadataV2,
        options: ArrayOpenOptions<TStorage>,
    ) -> Result<Self, ArrayCreateError> {
        let path = NodePath::new(path)?;
        let state = ArrayState::new(metadata)?;
        let attributes = Attributes::new(
            storage.clone(),
            meta_key_attributes(&path)?,
            options.read_only,
            options.cache_attrs,
        );
        Ok(Self {
            chunk_storage: options.chunk_store.unwrap_or_else(|| storage.clone()),
            storage,
            path,
            read_only: options.read_only,
            cache_metadata: options.cache_metadata,
            state: RwLock::new(Arc::new(state)),
            attributes,
        })
    }

    pub(crate) fn state(&self) -> Arc<ArrayState> {
        self.state.read().clone()
    }

    pub(crate) fn replace_state(&self, state: ArrayState) {
        *self.state.write() = Arc::new(state);
    }

    /// The array store.
    #[must_use]
    pub fn storage(&self) -> Arc<TStorage> {
        self.storage.clone()
    }

    /// The chunk store, which is the array store unless a separate chunk store was given.
    #[must_use]
    pub fn chunk_store(&self) -> Arc<TStorage> {
        self.chunk_storage.clone()
    }

    /// The node path.
    #[must_use]
    pub const fn path(&self) -> &NodePath {
        &self.path
    }

    /// The absolute name of the array, e.g. `/foo/bar`.
    #[must_use]
    pub fn name(&self) -> String {
        self.path.name()
    }

    /// The final component of the array name, e.g. `bar`.
    #[must_use]
    pub fn basename(&self) -> &str {
        self.path.basename()
    }

    /// Returns true if the array is read only.
    #[must_use]
    pub const fn read_only(&self) -> bool {
        self.read_only
    }

    /// Set whether the array and its attributes are read only.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        self.attributes.set_read_only(read_only);
    }

    /// Returns true if metadata is held for the lifetime of the array.
    #[must_use]
    pub const fn cache_metadata(&self) -> bool {
        self.cache_metadata
    }

    /// The user attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes<TStorage> {
        &self.attributes
    }

    /// The array metadata.
    #[must_use]
    pub fn metadata(&self) -> ArrayMetadataV2 {
        self.state().metadata.clone()
    }

    /// The array shape.
    #[must_use]
    pub fn shape(&self) -> ArrayShape {
        self.state().shape.clone()
    }

    /// The chunk shape.
    #[must_use]
    pub fn chunk_shape(&self) -> ArrayShape {
        self.state().chunk_shape.clone()
    }

    /// The number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.state().shape.len()
    }

    /// The total number of elements.
    #[must_use]
    pub fn size(&self) -> u64 {
        num_elements(&self.state().shape)
    }

    /// The data type.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.state().data_type
    }

    /// The byte order of stored elements, [`None`] for single byte data types.
    #[must_use]
    pub fn endianness(&self) -> Option<Endianness> {
        self.state().endianness
    }

    /// The fill value, [`None`] if null.
    #[must_use]
    pub fn fill_value(&self) -> Option<FillValue> {
        self.state().fill_value.clone()
    }

    /// The compressor, [`None`] if chunks are stored raw.
    #[must_use]
    pub fn compressor(&self) -> Option<Codec> {
        self.state().codec.clone()
    }

    /// The number of chunks along each dimension.
    #[must_use]
    pub fn chunk_grid_shape(&self) -> ArrayShape {
        self.state().chunk_grid_shape()
    }

    /// The total number of chunks.
    #[must_use]
    pub fn nchunks(&self) -> u64 {
        num_elements(&self.chunk_grid_shape())
    }

    /// The store key of the chunk at `chunk_coords`.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the key is invalid.
    pub fn chunk_key(&self, chunk_coords: &[u64]) -> Result<StoreKey, StorageError> {
        self.state().chunk_key(&self.path, chunk_coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(dtype: &str) -> ArrayMetadataV2 {
        ArrayMetadataV2::new(
            vec![10, 7],
            vec![4, 4].try_into().unwrap(),
            dtype,
            FillValueMetadataV2::from(3i64),
            None,
        )
    }

    #[test]
    fn array_state() {
        let state = ArrayState::new(metadata(">u2")).unwrap();
        assert_eq!(state.chunk_grid_shape(), vec![3, 2]);
        assert_eq!(state.chunk_strides, vec![4, 1]);
        assert_eq!(state.fill_chunk::<u16>(), vec![3u16; 16]);
        assert_eq!(state.needs_byte_swap(), !Endianness::Big.is_native());
        assert!(state.validate_chunk_coords(&[2, 1]).is_ok());
        assert!(state.validate_chunk_coords(&[3, 0]).is_err());
        assert!(state.validate_chunk_coords(&[0]).is_err());
    }

    #[test]
    fn array_state_byte_order() {
        let big = ArrayState::new(metadata(">u2")).unwrap();
        let elements: Vec<u16> = (0..16).collect();
        let encoded = big.encode_chunk(&elements).unwrap();
        assert_eq!(&encoded[..4], &[0, 0, 0, 1]);
        assert_eq!(big.decode_chunk::<u16>(&encoded).unwrap(), elements);

        let little = ArrayState::new(metadata("<u2")).unwrap();
        let encoded = little.encode_chunk(&elements).unwrap();
        assert_eq!(&encoded[..4], &[0, 0, 1, 0]);
        assert!(matches!(
            little.decode_chunk::<u16>(&encoded[1..]),
            Err(ArrayError::UnexpectedChunkDecodedSize { .. })
        ));
    }

    #[test]
    fn array_state_unsupported() {
        let mut unsupported = metadata("<i4");
        unsupported.order = ArrayMetadataV2Order::F;
        assert!(matches!(
            ArrayState::new(unsupported),
            Err(ArrayCreateError::UnsupportedOrder)
        ));
        assert!(matches!(
            ArrayState::new(metadata("<c8")),
            Err(ArrayCreateError::UnsupportedDataType(_))
        ));
        let mut unknown_codec = metadata("<i4");
        unknown_codec.compressor = Some(serde_json::from_str(r#"{"id": "unknown"}"#).unwrap());
        assert!(matches!(
            ArrayState::new(unknown_codec),
            Err(ArrayCreateError::CodecCreateError(_))
        ));
        let mut fill_value = metadata("<u1");
        fill_value.fill_value = FillValueMetadataV2::from(-1i64);
        assert!(matches!(
            ArrayState::new(fill_value),
            Err(ArrayCreateError::InvalidFillValueMetadata { .. })
        ));
    }
}
