use std::num::NonZeroU64;

use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The shape of a chunk. Every element is non-zero.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Deref, From)]
pub struct ChunkShape(Vec<NonZeroU64>);

/// A chunk shape with a zero element.
#[derive(Clone, Debug, Error)]
#[error("chunk shape {0:?} has a zero element")]
pub struct ChunkShapeError(Vec<u64>);

impl ChunkShape {
    /// Convert to a shape of [`u64`].
    #[must_use]
    pub fn to_array_shape(&self) -> Vec<u64> {
        self.0.iter().map(|chunk_size| chunk_size.get()).collect()
    }
}

impl TryFrom<Vec<u64>> for ChunkShape {
    type Error = ChunkShapeError;

    fn try_from(shape: Vec<u64>) -> Result<Self, Self::Error> {
        shape
            .iter()
            .map(|&chunk_size| NonZeroU64::new(chunk_size))
            .collect::<Option<Vec<_>>>()
            .map(Self)
            .ok_or(ChunkShapeError(shape))
    }
}
