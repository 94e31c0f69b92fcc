//! Selection normalisation and chunk indexing.
//!
//! A user selection is a list of [`Selector`]s, one per array dimension (possibly fewer, or with an [`Selector::Ellipsis`]).
//! [`normalize_selection`] expands it to exactly one [`DimSelection`] per dimension.
//! A [`BasicIndexer`] then maps the normalised selection onto the chunk grid, yielding one [`ChunkProjection`] per chunk touched.

mod basic_indexer;
mod dimension_indexer;
mod selection;
mod slice;

pub use basic_indexer::{BasicIndexer, ChunkProjection, ChunkProjections};
pub use dimension_indexer::{ChunkDimProjection, DimIndexer};
pub use selection::{
    is_total_slice, normalize_integer_selection, normalize_selection, replace_ellipsis,
    selection_shape, ArraySelection, DimSelection, Selector,
};
pub use slice::{Slice, SliceIndices};

use thiserror::Error;

/// An indexing error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IndexingError {
    /// Malformed slice arguments.
    #[error("invalid slice {start:?}:{stop:?}:{step:?}: {reason}")]
    InvalidSlice {
        /// The slice start.
        start: Option<i64>,
        /// The slice stop.
        stop: Option<i64>,
        /// The slice step.
        step: Option<i64>,
        /// Why the slice is invalid.
        reason: &'static str,
    },
    /// A selection has more entries than the array has dimensions.
    #[error("too many indices for array: array is {expected}-dimensional, but {got} were indexed")]
    TooManyIndices {
        /// The array dimensionality.
        expected: usize,
        /// The number of selection entries.
        got: usize,
    },
    /// An integer selection is out of bounds.
    #[error("index {index} is out of bounds for dimension with length {length}")]
    BoundsCheck {
        /// The requested index.
        index: i64,
        /// The length of the dimension.
        length: u64,
    },
    /// A selection has more than one ellipsis.
    #[error("an index can only have a single ellipsis ('...')")]
    MultipleEllipsis,
    /// The chunk shape dimensionality does not match the array shape.
    #[error("chunk shape {chunk_shape:?} is incompatible with array shape {shape:?}")]
    IncompatibleChunkShape {
        /// The array shape.
        shape: Vec<u64>,
        /// The chunk shape.
        chunk_shape: Vec<u64>,
    },
}
