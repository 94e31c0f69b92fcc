use thiserror::Error;
use zarrv2_codec::{CodecError, PluginCreateError};
use zarrv2_metadata::{ChunkShapeError, FillValueMetadataV2};
use zarrv2_storage::StorageError;

use super::{ArrayShape, DataType, UnsupportedDataTypeError};
use crate::{indexer::IndexingError, node::NodePathError};

/// An array creation error.
#[derive(Clone, Debug, Error)]
pub enum ArrayCreateError {
    /// An invalid node path.
    #[error(transparent)]
    NodePathError(#[from] NodePathError),
    /// Unsupported data type.
    #[error(transparent)]
    UnsupportedDataType(#[from] UnsupportedDataTypeError),
    /// A float16 array was opened with float16 support disabled.
    #[error("float16 data type support is disabled")]
    Float16Unsupported,
    /// Invalid fill value metadata.
    #[error("invalid fill value metadata for data type `{data_type}`: {fill_value:?}")]
    InvalidFillValueMetadata {
        /// The data type.
        data_type: DataType,
        /// The fill value metadata.
        fill_value: FillValueMetadataV2,
    },
    /// Error creating the compressor.
    #[error(transparent)]
    CodecCreateError(#[from] PluginCreateError),
    /// Filters are not supported.
    #[error("array filters are not supported")]
    UnsupportedFilters,
    /// Column-major (`F`) order is not supported.
    #[error("array order F is not supported")]
    UnsupportedOrder,
    /// Invalid chunk shape.
    #[error(transparent)]
    InvalidChunkShape(#[from] ChunkShapeError),
    /// The dimensionality of the chunk shape does not match the array shape.
    #[error("chunk dimensionality {0} does not match array dimensionality {1}")]
    InvalidChunkDimensionality(usize, usize),
    /// An array already exists at the path.
    #[error("an array already exists at path {_0}")]
    ContainsArray(String),
    /// A group already exists at the path.
    #[error("a group already exists at path {_0}")]
    ContainsGroup(String),
    /// Missing metadata.
    #[error("array metadata is missing")]
    MissingMetadata,
    /// The array is read only.
    #[error("array is read only")]
    ReadOnly,
    /// Storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
}

/// Array errors.
#[derive(Clone, Debug, Error)]
pub enum ArrayError {
    /// The array is read only.
    #[error("array is read only")]
    ReadOnly,
    /// A store error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// A codec error.
    #[error(transparent)]
    CodecError(#[from] CodecError),
    /// An indexing error.
    #[error(transparent)]
    IndexingError(#[from] IndexingError),
    /// The metadata could not be reloaded.
    #[error(transparent)]
    ArrayCreateError(#[from] ArrayCreateError),
    /// Invalid chunk grid indices.
    #[error("invalid chunk grid indices: {_0:?}")]
    InvalidChunkGridIndicesError(Vec<u64>),
    /// The data shape does not match the selection shape.
    #[error("got data with shape {got:?}, expected {expected:?}")]
    InvalidDataShape {
        /// The shape of the selection.
        expected: ArrayShape,
        /// The shape of the data.
        got: ArrayShape,
    },
    /// The element type does not match the array data type.
    #[error("the element type {got} is incompatible with the array data type {expected}")]
    IncompatibleElementType {
        /// The array data type.
        expected: DataType,
        /// The data type of the element.
        got: DataType,
    },
    /// The number of elements does not match the shape.
    #[error("got {got} elements, expected {expected} for shape {shape:?}")]
    InvalidElementCount {
        /// The shape.
        shape: ArrayShape,
        /// The expected number of elements.
        expected: u64,
        /// The number of elements.
        got: u64,
    },
    /// A decoded chunk has an unexpected size.
    #[error("decoded chunk is {got} bytes, expected {expected}")]
    UnexpectedChunkDecodedSize {
        /// The expected size in bytes.
        expected: u64,
        /// The decoded size in bytes.
        got: u64,
    },
}
