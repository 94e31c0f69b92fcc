use itertools::izip;

use super::{
    normalize_selection, ChunkDimProjection, DimIndexer, DimSelection, IndexingError, Selector,
    SliceIndices,
};

/// The intersection of an array selection with one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkProjection {
    /// The chunk grid coordinates.
    pub chunk_coords: Vec<u64>,
    /// The selection within the chunk, one entry per array dimension.
    pub chunk_selection: Vec<DimSelection>,
    /// The region of the output covered by this chunk, one entry per non-squeezed dimension.
    pub out_selection: Vec<SliceIndices>,
}

/// Maps an array selection onto the chunks of a regular chunk grid.
///
/// Only the chunks touched by the selection are enumerated, in row-major chunk order.
#[derive(Clone, Debug)]
pub struct BasicIndexer {
    dim_projections: Vec<Vec<ChunkDimProjection>>,
    output_shape: Vec<u64>,
    drop_axes: Vec<usize>,
}

impl BasicIndexer {
    /// Create a new indexer for `selection` of an array with `shape` and `chunk_shape`.
    ///
    /// # Errors
    /// Returns an [`IndexingError`] if the selection is invalid for `shape` or `chunk_shape` is incompatible with `shape`.
    pub fn new(
        selection: &[Selector],
        shape: &[u64],
        chunk_shape: &[u64],
    ) -> Result<Self, IndexingError> {
        if shape.len() != chunk_shape.len() || chunk_shape.contains(&0) {
            return Err(IndexingError::IncompatibleChunkShape {
                shape: shape.to_vec(),
                chunk_shape: chunk_shape.to_vec(),
            });
        }
        let selection = normalize_selection(selection, shape)?;

        let mut dim_projections = Vec::with_capacity(shape.len());
        let mut output_shape = Vec::with_capacity(shape.len());
        let mut drop_axes = Vec::new();
        for (axis, (&selection, &length, &chunk_length)) in
            izip!(&selection, shape, chunk_shape).enumerate()
        {
            let indexer = DimIndexer::new(selection, length, chunk_length);
            if indexer.is_squeezed() {
                drop_axes.push(axis);
            } else {
                output_shape.push(indexer.num_items());
            }
            dim_projections.push(indexer.projections());
        }

        Ok(Self {
            dim_projections,
            output_shape,
            drop_axes,
        })
    }

    /// The shape of the selected data, excluding squeezed dimensions.
    #[must_use]
    pub fn output_shape(&self) -> &[u64] {
        &self.output_shape
    }

    /// The axes squeezed from the output by integer selectors.
    #[must_use]
    pub fn drop_axes(&self) -> &[usize] {
        &self.drop_axes
    }

    /// The number of elements in the output.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.output_shape.iter().product()
    }

    /// The number of chunks touched by the selection.
    #[must_use]
    pub fn num_chunks(&self) -> usize {
        self.dim_projections.iter().map(Vec::len).product()
    }

    /// An iterator over the chunk projections.
    #[must_use]
    pub fn iter(&self) -> ChunkProjections<'_> {
        let empty = self.dim_projections.iter().any(Vec::is_empty);
        ChunkProjections {
            dim_projections: &self.dim_projections,
            position: (!empty).then(|| vec![0; self.dim_projections.len()]),
        }
    }
}

impl<'a> IntoIterator for &'a BasicIndexer {
    type Item = ChunkProjection;
    type IntoIter = ChunkProjections<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the [`ChunkProjection`]s of a [`BasicIndexer`].
pub struct ChunkProjections<'a> {
    dim_projections: &'a [Vec<ChunkDimProjection>],
    position: Option<Vec<usize>>,
}

impl Iterator for ChunkProjections<'_> {
    type Item = ChunkProjection;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.position.as_mut()?;

        let ndim = self.dim_projections.len();
        let mut projection = ChunkProjection {
            chunk_coords: Vec::with_capacity(ndim),
            chunk_selection: Vec::with_capacity(ndim),
            out_selection: Vec::with_capacity(ndim),
        };
        for (projections, &i) in self.dim_projections.iter().zip(position.iter()) {
            let dim = &projections[i];
            projection.chunk_coords.push(dim.chunk_index);
            projection.chunk_selection.push(dim.chunk_selection);
            projection.out_selection.extend(dim.out_selection);
        }

        // Advance the odometer, last dimension fastest
        let mut exhausted = true;
        for (axis, i) in position.iter_mut().enumerate().rev() {
            *i += 1;
            if *i < self.dim_projections[axis].len() {
                exhausted = false;
                break;
            }
            *i = 0;
        }
        if exhausted {
            self.position = None;
        }

        Some(projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::Slice;

    #[test]
    fn basic_indexer_2d() {
        let indexer = BasicIndexer::new(
            &[Selector::Index(0), Slice::to(5).into()],
            &[8, 8],
            &[4, 4],
        )
        .unwrap();
        assert_eq!(indexer.output_shape(), &[5]);
        assert_eq!(indexer.drop_axes(), &[0]);
        let projections: Vec<_> = indexer.iter().collect();
        assert_eq!(projections.len(), 2);
        assert_eq!(projections[0].chunk_coords, vec![0, 0]);
        assert_eq!(
            projections[0].chunk_selection,
            vec![
                DimSelection::Index(0),
                DimSelection::Slice(SliceIndices::contiguous(0, 4))
            ]
        );
        assert_eq!(projections[0].out_selection, vec![SliceIndices::contiguous(0, 4)]);
        assert_eq!(projections[1].chunk_coords, vec![0, 1]);
        assert_eq!(projections[1].out_selection, vec![SliceIndices::contiguous(4, 1)]);
    }

    #[test]
    fn basic_indexer_row_major() {
        let indexer = BasicIndexer::new(&[], &[5, 3], &[2, 2]).unwrap();
        assert_eq!(indexer.num_chunks(), 6);
        let coords: Vec<_> = indexer.iter().map(|p| p.chunk_coords).collect();
        assert_eq!(
            coords,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![1, 0],
                vec![1, 1],
                vec![2, 0],
                vec![2, 1]
            ]
        );
        let total: u64 = indexer
            .iter()
            .map(|p| p.out_selection.iter().map(|s| s.length).product::<u64>())
            .sum();
        assert_eq!(total, indexer.num_elements());
    }

    #[test]
    fn basic_indexer_empty_and_scalar() {
        let indexer =
            BasicIndexer::new(&[Slice::range(0, 0).unwrap().into()], &[2, 3], &[1, 1]).unwrap();
        assert_eq!(indexer.output_shape(), &[0, 3]);
        assert_eq!(indexer.iter().count(), 0);

        let indexer = BasicIndexer::new(&[], &[], &[]).unwrap();
        let projections: Vec<_> = indexer.iter().collect();
        assert_eq!(projections.len(), 1);
        assert!(projections[0].chunk_coords.is_empty());
        assert!(indexer.output_shape().is_empty());

        let indexer = BasicIndexer::new(&[1.into(), 2.into()], &[3, 3], &[2, 2]).unwrap();
        assert!(indexer.output_shape().is_empty());
        assert_eq!(indexer.drop_axes(), &[0, 1]);
        assert_eq!(indexer.iter().count(), 1);
    }

    #[test]
    fn basic_indexer_errors() {
        assert!(matches!(
            BasicIndexer::new(&[], &[3, 3], &[2]),
            Err(IndexingError::IncompatibleChunkShape { .. })
        ));
        assert!(matches!(
            BasicIndexer::new(&[0.into(), 0.into(), 0.into()], &[3, 3], &[2, 2]),
            Err(IndexingError::TooManyIndices { .. })
        ));
        assert!(matches!(
            BasicIndexer::new(&[3.into()], &[3, 3], &[2, 2]),
            Err(IndexingError::BoundsCheck { .. })
        ));
    }
}
