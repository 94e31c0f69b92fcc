use derive_more::{Deref, From};

use super::{IndexingError, Slice, SliceIndices};

/// A selector for one dimension of an array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    /// A single index, negative values count back from the end of the dimension.
    ///
    /// An indexed dimension is squeezed from the output.
    Index(i64),
    /// A slice.
    Range(Slice),
    /// The full dimension, equivalent to `Range(Slice::full())`.
    Full,
    /// Expands to as many [`Selector::Full`] as required to cover the unspecified dimensions.
    Ellipsis,
}

impl From<i64> for Selector {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<Slice> for Selector {
    fn from(slice: Slice) -> Self {
        Self::Range(slice)
    }
}

impl From<std::ops::RangeFull> for Selector {
    fn from(_: std::ops::RangeFull) -> Self {
        Self::Full
    }
}

/// A user selection of an array, a sequence of [`Selector`]s.
///
/// The selection may have fewer entries than the array has dimensions, in which case trailing dimensions are fully selected.
/// An empty selection selects the whole array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deref, From)]
pub struct ArraySelection(Vec<Selector>);

impl ArraySelection {
    /// Create a new selection.
    #[must_use]
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self(selectors)
    }

    /// A selection of the whole array.
    #[must_use]
    pub fn all() -> Self {
        Self(Vec::new())
    }
}

impl From<Selector> for ArraySelection {
    fn from(selector: Selector) -> Self {
        Self(vec![selector])
    }
}

impl From<i64> for ArraySelection {
    fn from(index: i64) -> Self {
        Self(vec![Selector::Index(index)])
    }
}

impl From<Slice> for ArraySelection {
    fn from(slice: Slice) -> Self {
        Self(vec![Selector::Range(slice)])
    }
}

impl From<&[Selector]> for ArraySelection {
    fn from(selectors: &[Selector]) -> Self {
        Self(selectors.to_vec())
    }
}

impl<const N: usize> From<[Selector; N]> for ArraySelection {
    fn from(selectors: [Selector; N]) -> Self {
        Self(selectors.to_vec())
    }
}

/// A normalised selection of one dimension.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DimSelection {
    /// A single in-bounds index. The dimension is squeezed.
    Index(u64),
    /// A slice resolved against the dimension length.
    Slice(SliceIndices),
}

impl DimSelection {
    /// Returns true if the dimension is squeezed from the output.
    #[must_use]
    pub const fn is_squeezed(&self) -> bool {
        matches!(self, Self::Index(_))
    }

    /// The number of selected elements.
    #[must_use]
    pub const fn num_elements(&self) -> u64 {
        match self {
            Self::Index(_) => 1,
            Self::Slice(slice) => slice.length,
        }
    }
}

/// Replace the ellipsis of a selection and pad it with [`Selector::Full`] to the dimensionality of `shape`.
///
/// The ellipsis is removed if the selection already has enough explicit entries.
///
/// # Errors
/// Returns [`IndexingError::MultipleEllipsis`] if the selection has more than one ellipsis,
/// or [`IndexingError::TooManyIndices`] if the result has more entries than `shape`.
pub fn replace_ellipsis(
    selection: &[Selector],
    shape: &[u64],
) -> Result<Vec<Selector>, IndexingError> {
    let ndim = shape.len();
    let mut ellipses = selection
        .iter()
        .enumerate()
        .filter(|(_, selector)| matches!(selector, Selector::Ellipsis));
    let ellipsis = ellipses.next().map(|(position, _)| position);
    if ellipses.next().is_some() {
        return Err(IndexingError::MultipleEllipsis);
    }

    let mut selectors = Vec::with_capacity(ndim.max(selection.len()));
    if let Some(position) = ellipsis {
        let explicit = selection.len() - 1;
        selectors.extend_from_slice(&selection[..position]);
        if explicit < ndim {
            selectors.extend(std::iter::repeat_n(Selector::Full, ndim - explicit));
        }
        selectors.extend_from_slice(&selection[position + 1..]);
    } else {
        selectors.extend_from_slice(selection);
    }

    if selectors.len() > ndim {
        return Err(IndexingError::TooManyIndices {
            expected: ndim,
            got: selectors.len(),
        });
    }
    selectors.resize(ndim, Selector::Full);
    Ok(selectors)
}

/// Normalise an integer index against a dimension of `length`, wrapping negative indices.
///
/// # Errors
/// Returns [`IndexingError::BoundsCheck`] if `index` is outside of `[-length, length)`.
pub fn normalize_integer_selection(index: i64, length: u64) -> Result<u64, IndexingError> {
    let out_of_bounds = IndexingError::BoundsCheck { index, length };
    let normalized = if index < 0 {
        i128::from(length) + i128::from(index)
    } else {
        i128::from(index)
    };
    if normalized < 0 || normalized >= i128::from(length) {
        return Err(out_of_bounds);
    }
    u64::try_from(normalized).map_err(|_| out_of_bounds)
}

/// Normalise a selection of an array with `shape` to exactly one [`DimSelection`] per dimension.
///
/// # Errors
/// Returns an [`IndexingError`] if the selection is invalid for `shape`.
pub fn normalize_selection(
    selection: &[Selector],
    shape: &[u64],
) -> Result<Vec<DimSelection>, IndexingError> {
    replace_ellipsis(selection, shape)?
        .into_iter()
        .zip(shape)
        .map(|(selector, &length)| match selector {
            Selector::Index(index) => {
                normalize_integer_selection(index, length).map(DimSelection::Index)
            }
            Selector::Range(slice) => Ok(DimSelection::Slice(slice.indices(length))),
            Selector::Full | Selector::Ellipsis => {
                Ok(DimSelection::Slice(Slice::full().indices(length)))
            }
        })
        .collect()
}

/// The shape of the data selected by `selection`, excluding squeezed dimensions.
#[must_use]
pub fn selection_shape(selection: &[DimSelection]) -> Vec<u64> {
    selection
        .iter()
        .filter_map(|selection| match selection {
            DimSelection::Index(_) => None,
            DimSelection::Slice(slice) => Some(slice.length),
        })
        .collect()
}

/// Returns true if `selection` covers every element of a chunk with `chunk_shape` in order.
///
/// Each dimension must be a unit step slice starting at zero with the length of the chunk dimension.
#[must_use]
pub fn is_total_slice(selection: &[DimSelection], chunk_shape: &[u64]) -> bool {
    selection.len() == chunk_shape.len()
        && std::iter::zip(selection, chunk_shape).all(|(selection, &length)| match selection {
            DimSelection::Index(_) => false,
            DimSelection::Slice(slice) => {
                slice.start == 0 && slice.step == 1 && slice.length == length
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_ellipsis_expands() {
        let s = Slice::range(1, 2).unwrap();
        assert_eq!(
            replace_ellipsis(&[Selector::Ellipsis], &[2, 3]).unwrap(),
            vec![Selector::Full, Selector::Full]
        );
        assert_eq!(
            replace_ellipsis(&[Selector::Index(0), Selector::Ellipsis], &[2, 3, 4]).unwrap(),
            vec![Selector::Index(0), Selector::Full, Selector::Full]
        );
        assert_eq!(
            replace_ellipsis(&[Selector::Ellipsis, s.into()], &[2, 3, 4]).unwrap(),
            vec![Selector::Full, Selector::Full, Selector::Range(s)]
        );
        assert_eq!(
            replace_ellipsis(&[1.into(), Selector::Ellipsis, 2.into()], &[5, 5]).unwrap(),
            vec![Selector::Index(1), Selector::Index(2)]
        );
        assert_eq!(
            replace_ellipsis(&[Selector::Index(1)], &[5, 5]).unwrap(),
            vec![Selector::Index(1), Selector::Full]
        );
        assert_eq!(replace_ellipsis(&[], &[5]).unwrap(), vec![Selector::Full]);
        assert_eq!(replace_ellipsis(&[Selector::Ellipsis], &[]).unwrap(), vec![]);
    }

    #[test]
    fn replace_ellipsis_errors() {
        assert_eq!(
            replace_ellipsis(&[Selector::Ellipsis, Selector::Ellipsis], &[2, 3]),
            Err(IndexingError::MultipleEllipsis)
        );
        assert_eq!(
            replace_ellipsis(&[0.into(), 0.into(), 0.into()], &[2, 3]),
            Err(IndexingError::TooManyIndices {
                expected: 2,
                got: 3
            })
        );
        assert_eq!(
            replace_ellipsis(&[0.into()], &[]),
            Err(IndexingError::TooManyIndices {
                expected: 0,
                got: 1
            })
        );
    }

    #[test]
    fn integer_selection() {
        assert_eq!(normalize_integer_selection(0, 5), Ok(0));
        assert_eq!(normalize_integer_selection(4, 5), Ok(4));
        assert_eq!(normalize_integer_selection(-1, 5), Ok(4));
        assert_eq!(normalize_integer_selection(-5, 5), Ok(0));
        assert_eq!(
            normalize_integer_selection(5, 5),
            Err(IndexingError::BoundsCheck {
                index: 5,
                length: 5
            })
        );
        assert!(normalize_integer_selection(-6, 5).is_err());
        assert!(normalize_integer_selection(0, 0).is_err());
    }

    #[test]
    fn normalize_and_shape() {
        let selection = normalize_selection(
            &[Selector::Index(-1), Slice::new(None, None, Some(-2)).unwrap().into()],
            &[3, 5],
        )
        .unwrap();
        assert_eq!(selection[0], DimSelection::Index(2));
        assert_eq!(
            selection[1],
            DimSelection::Slice(SliceIndices {
                start: 4,
                stop: -1,
                step: -2,
                length: 3
            })
        );
        assert_eq!(selection_shape(&selection), vec![3]);

        let selection =
            normalize_selection(&[Slice::range(0, 0).unwrap().into()], &[2, 3]).unwrap();
        assert_eq!(selection_shape(&selection), vec![0, 3]);
    }

    #[test]
    fn total_slice() {
        let full = normalize_selection(&[], &[4, 4]).unwrap();
        assert!(is_total_slice(&full, &[4, 4]));
        assert!(!is_total_slice(&full, &[4, 5]));
        let partial = normalize_selection(&[Slice::range(0, 2).unwrap().into()], &[4, 4]).unwrap();
        assert!(!is_total_slice(&partial, &[4, 4]));
        let reversed =
            normalize_selection(&[Slice::new(None, None, Some(-1)).unwrap().into()], &[4])
                .unwrap();
        assert!(!is_total_slice(&reversed, &[4]));
        let indexed = normalize_selection(&[0.into()], &[1]).unwrap();
        assert!(!is_total_slice(&indexed, &[1]));
    }
}
