use super::{DimSelection, SliceIndices};

/// The intersection of a one dimensional selection with one chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkDimProjection {
    /// The chunk index along the dimension.
    pub chunk_index: u64,
    /// The selection in chunk-local coordinates.
    pub chunk_selection: DimSelection,
    /// The output positions covered by this chunk, or [`None`] if the dimension is squeezed.
    pub out_selection: Option<SliceIndices>,
}

/// Maps a normalised selection of one dimension onto the chunks of that dimension.
#[derive(Copy, Clone, Debug)]
pub struct DimIndexer {
    selection: DimSelection,
    length: u64,
    chunk_length: u64,
}

impl DimIndexer {
    /// Create a new dimension indexer.
    ///
    /// `chunk_length` must be non-zero.
    #[must_use]
    pub const fn new(selection: DimSelection, length: u64, chunk_length: u64) -> Self {
        Self {
            selection,
            length,
            chunk_length,
        }
    }

    /// The number of selected elements.
    #[must_use]
    pub const fn num_items(&self) -> u64 {
        self.selection.num_elements()
    }

    /// Returns true if the dimension is squeezed from the output.
    #[must_use]
    pub const fn is_squeezed(&self) -> bool {
        self.selection.is_squeezed()
    }

    /// The chunk projections, in the order the selection traverses the dimension.
    ///
    /// Only chunks holding at least one selected element are visited.
    /// The output selections are increasing and partition `[0, num_items)`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn projections(&self) -> Vec<ChunkDimProjection> {
        let chunk_length = self.chunk_length;
        let slice = match self.selection {
            DimSelection::Index(index) => {
                return vec![ChunkDimProjection {
                    chunk_index: index / chunk_length,
                    chunk_selection: DimSelection::Index(index % chunk_length),
                    out_selection: None,
                }];
            }
            DimSelection::Slice(slice) => slice,
        };
        if slice.length == 0 {
            return Vec::new();
        }

        let step = slice.step;
        let step_abs = step.unsigned_abs();
        let count = slice.length as i64;
        let length = self.length as i64;
        let chunk_len = chunk_length as i64;

        // Jump from the first unvisited element to the last element sharing its chunk
        let mut projections = Vec::new();
        let mut first = 0;
        while first < count {
            let index = slice.start + first * step;
            let chunk = index / chunk_len;
            let offset = chunk * chunk_len;
            let room = if step > 0 {
                offset.saturating_add(chunk_len).min(length) - 1 - index
            } else {
                index - offset
            };
            let last = count.min(first.saturating_add((room as u64 / step_abs) as i64 + 1));
            let items = (last - first) as u64;
            projections.push(ChunkDimProjection {
                chunk_index: chunk as u64,
                chunk_selection: DimSelection::Slice(SliceIndices::from_start_step(
                    index - offset,
                    step,
                    items,
                )),
                out_selection: Some(SliceIndices::contiguous(first as u64, items)),
            });
            first = last;
        }
        projections
    }
}
