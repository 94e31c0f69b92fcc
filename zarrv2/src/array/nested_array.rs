//! A tree-shaped dense array.
//!
//! A [`NestedArray`] of rank `N > 1` is a branch of `shape[0]` nested arrays of rank `N - 1`.
//! Arrays of rank zero and one are leaves holding a contiguous buffer.

use crate::indexer::{normalize_selection, selection_shape, ArraySelection, DimSelection};

use super::{
    array_index, num_elements, ArrayError, ArrayOrScalar, ArrayShape, ArrayValue, Element,
    RawArray,
};

/// The data of a [`NestedArray`].
#[derive(Clone, Debug, PartialEq)]
pub enum NestedArrayData<T> {
    /// The elements of the innermost dimension.
    Leaf(Vec<T>),
    /// The sub-arrays of the outermost dimension.
    Branch(Vec<NestedArrayData<T>>),
}

/// A dense N-dimensional array stored as a tree of buffers.
#[derive(Clone, Debug, PartialEq)]
pub struct NestedArray<T> {
    shape: ArrayShape,
    data: NestedArrayData<T>,
}

enum Selected<T> {
    Scalar(T),
    Data(NestedArrayData<T>),
}

#[derive(Copy, Clone)]
enum Source<'a, T> {
    Scalar(T),
    Data(&'a NestedArrayData<T>),
}

impl<'a, T: Copy> Source<'a, T> {
    fn item(self, i: usize) -> Self {
        match self {
            Self::Scalar(value) => Self::Scalar(value),
            Self::Data(NestedArrayData::Leaf(values)) => Self::Scalar(values[i]),
            Self::Data(NestedArrayData::Branch(children)) => Self::Data(&children[i]),
        }
    }

    fn scalar(self) -> Option<T> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Data(NestedArrayData::Leaf(values)) => values.first().copied(),
            Self::Data(NestedArrayData::Branch(_)) => None,
        }
    }
}

fn build<T: Copy>(elements: &[T], shape: &[u64]) -> NestedArrayData<T> {
    match shape {
        [] | [_] => NestedArrayData::Leaf(elements.to_vec()),
        [length, inner @ ..] => {
            let stride = array_index(num_elements(inner));
            NestedArrayData::Branch(
                (0..array_index(*length))
                    .map(|i| build(&elements[i * stride..(i + 1) * stride], inner))
                    .collect(),
            )
        }
    }
}

fn flatten_into<T: Copy>(data: &NestedArrayData<T>, out: &mut Vec<T>) {
    match data {
        NestedArrayData::Leaf(values) => out.extend_from_slice(values),
        NestedArrayData::Branch(children) => {
            for child in children {
                flatten_into(child, out);
            }
        }
    }
}

fn get_data<T: Copy>(data: &NestedArrayData<T>, selection: &[DimSelection]) -> Selected<T> {
    match (data, selection.split_first()) {
        (NestedArrayData::Leaf(values), None) => Selected::Scalar(values[0]),
        (NestedArrayData::Leaf(values), Some((DimSelection::Index(i), _))) => {
            Selected::Scalar(values[array_index(*i)])
        }
        (NestedArrayData::Leaf(values), Some((DimSelection::Slice(slice), _))) => {
            let length = array_index(slice.length);
            if length == 0 {
                Selected::Data(NestedArrayData::Leaf(Vec::new()))
            } else if slice.is_contiguous() {
                let start = array_index(slice.index(0));
                Selected::Data(NestedArrayData::Leaf(values[start..start + length].to_vec()))
            } else {
                Selected::Data(NestedArrayData::Leaf(
                    (0..slice.length)
                        .map(|i| values[array_index(slice.index(i))])
                        .collect(),
                ))
            }
        }
        (NestedArrayData::Branch(children), Some((DimSelection::Index(i), rest))) => {
            get_data(&children[array_index(*i)], rest)
        }
        (NestedArrayData::Branch(children), Some((DimSelection::Slice(slice), rest))) => {
            let items =
                (0..slice.length).map(|i| get_data(&children[array_index(slice.index(i))], rest));
            let data = if rest.iter().all(DimSelection::is_squeezed) {
                NestedArrayData::Leaf(
                    items
                        .filter_map(|item| match item {
                            Selected::Scalar(value) => Some(value),
                            Selected::Data(_) => None,
                        })
                        .collect(),
                )
            } else {
                NestedArrayData::Branch(
                    items
                        .filter_map(|item| match item {
                            Selected::Data(data) => Some(data),
                            Selected::Scalar(_) => None,
                        })
                        .collect(),
                )
            };
            Selected::Data(data)
        }
        (NestedArrayData::Branch(_), None) => Selected::Data(data.clone()),
    }
}

fn set_data<T: Copy>(dst: &mut NestedArrayData<T>, selection: &[DimSelection], src: Source<T>) {
    match (dst, selection.split_first()) {
        (NestedArrayData::Leaf(values), None) => {
            if let Some(value) = src.scalar() {
                values[0] = value;
            }
        }
        (NestedArrayData::Leaf(values), Some((DimSelection::Index(i), _))) => {
            if let Some(value) = src.scalar() {
                values[array_index(*i)] = value;
            }
        }
        (NestedArrayData::Leaf(values), Some((DimSelection::Slice(slice), _))) => {
            if slice.length == 0 {
                return;
            }
            let length = array_index(slice.length);
            let start = array_index(slice.index(0));
            match src {
                Source::Scalar(value) if slice.is_contiguous() => {
                    values[start..start + length].fill(value);
                }
                Source::Data(NestedArrayData::Leaf(src)) if slice.is_contiguous() => {
                    values[start..start + length].copy_from_slice(&src[..length]);
                }
                _ => {
                    for i in 0..slice.length {
                        if let Some(value) = src.item(array_index(i)).scalar() {
                            values[array_index(slice.index(i))] = value;
                        }
                    }
                }
            }
        }
        (NestedArrayData::Branch(children), Some((DimSelection::Index(i), rest))) => {
            set_data(&mut children[array_index(*i)], rest, src);
        }
        (NestedArrayData::Branch(children), Some((DimSelection::Slice(slice), rest))) => {
            for i in 0..slice.length {
                set_data(
                    &mut children[array_index(slice.index(i))],
                    rest,
                    src.item(array_index(i)),
                );
            }
        }
        (NestedArrayData::Branch(_), None) => {}
    }
}

impl<T: Element> NestedArray<T> {
    /// Create a nested array from elements in row-major order.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidElementCount`] if the number of elements does not match `shape`.
    pub fn from_flat(elements: Vec<T>, shape: ArrayShape) -> Result<Self, ArrayError> {
        let expected = num_elements(&shape);
        if elements.len() as u64 != expected {
            return Err(ArrayError::InvalidElementCount {
                shape,
                expected,
                got: elements.len() as u64,
            });
        }
        let data = match shape.len() {
            0 | 1 => NestedArrayData::Leaf(elements),
            _ => build(&elements, &shape),
        };
        Ok(Self { shape, data })
    }

    /// Create a nested array with every element set to `value`.
    #[must_use]
    pub fn filled(shape: ArrayShape, value: T) -> Self {
        let data = build(&vec![value; array_index(num_elements(&shape))], &shape);
        Self { shape, data }
    }

    /// Create a nested array of zeros.
    #[must_use]
    pub fn zeros(shape: ArrayShape) -> Self {
        Self::filled(shape, T::zeroed())
    }

    /// The shape of the array.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// The number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// The number of elements.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        num_elements(&self.shape)
    }

    /// The tree of buffers.
    #[must_use]
    pub const fn data(&self) -> &NestedArrayData<T> {
        &self.data
    }

    /// The elements in row-major order.
    #[must_use]
    pub fn flatten(&self) -> Vec<T> {
        let mut elements = Vec::with_capacity(array_index(self.num_elements()));
        flatten_into(&self.data, &mut elements);
        elements
    }

    /// Read a selection of the array.
    ///
    /// Dimensions selected with an integer are squeezed.
    /// A selection that squeezes every dimension returns a scalar.
    ///
    /// # Errors
    /// Returns [`ArrayError::IndexingError`] if the selection is invalid.
    pub fn get(
        &self,
        selection: impl Into<ArraySelection>,
    ) -> Result<ArrayOrScalar<Self, T>, ArrayError> {
        let selection = normalize_selection(&selection.into(), &self.shape)?;
        Ok(self.get_selection(&selection))
    }

    pub(crate) fn get_selection(&self, selection: &[DimSelection]) -> ArrayOrScalar<Self, T> {
        match get_data(&self.data, selection) {
            Selected::Scalar(value) => ArrayOrScalar::Scalar(value),
            Selected::Data(data) => ArrayOrScalar::Array(Self {
                shape: selection_shape(selection),
                data,
            }),
        }
    }

    /// Write a scalar or an array to a selection of the array.
    ///
    /// An array value must have the shape of the selection.
    ///
    /// # Errors
    /// Returns [`ArrayError::IndexingError`] if the selection is invalid,
    /// or [`ArrayError::InvalidDataShape`] if the value shape does not match the selection.
    pub fn set(
        &mut self,
        selection: impl Into<ArraySelection>,
        value: impl Into<ArrayValue<T>>,
    ) -> Result<(), ArrayError> {
        let selection = normalize_selection(&selection.into(), &self.shape)?;
        match value.into() {
            ArrayValue::Scalar(value) => self.set_selection_scalar(&selection, value),
            ArrayValue::Nested(value) => {
                check_shape(&selection, value.shape())?;
                self.set_selection(&selection, &value);
            }
            ArrayValue::Raw(value) => {
                check_shape(&selection, value.shape())?;
                self.set_selection(&selection, &Self::from(value));
            }
        }
        Ok(())
    }

    pub(crate) fn set_selection_scalar(&mut self, selection: &[DimSelection], value: T) {
        set_data(&mut self.data, selection, Source::Scalar(value));
    }

    pub(crate) fn set_selection(&mut self, selection: &[DimSelection], value: &Self) {
        set_data(&mut self.data, selection, Source::Data(&value.data));
    }
}

pub(crate) fn check_shape(selection: &[DimSelection], shape: &[u64]) -> Result<(), ArrayError> {
    let expected = selection_shape(selection);
    if expected == shape {
        Ok(())
    } else {
        Err(ArrayError::InvalidDataShape {
            expected,
            got: shape.to_vec(),
        })
    }
}

impl<T: Element> From<RawArray<T>> for NestedArray<T> {
    fn from(array: RawArray<T>) -> Self {
        let shape = array.shape().to_vec();
        let data = match shape.len() {
            0 | 1 => NestedArrayData::Leaf(array.into_data()),
            _ => build(&array.into_data(), &shape),
        };
        Self { shape, data }
    }
}

impl<T> From<NestedArray<T>> for ArrayValue<T> {
    fn from(array: NestedArray<T>) -> Self {
        Self::Nested(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::{Selector, Slice};

    fn range(shape: &[u64]) -> NestedArray<i32> {
        let n = i32::try_from(num_elements(shape)).unwrap();
        NestedArray::from_flat((0..n).collect(), shape.to_vec()).unwrap()
    }

    fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Selector {
        Slice::new(start, stop, step).unwrap().into()
    }

    fn get_flat(array: &NestedArray<i32>, selection: &[Selector]) -> (Vec<i32>, Vec<u64>) {
        match array.get(selection).unwrap() {
            ArrayOrScalar::Array(array) => (array.flatten(), array.shape().to_vec()),
            ArrayOrScalar::Scalar(value) => (vec![value], vec![]),
        }
    }

    #[test]
    fn nested_array_construct_flatten() {
        let array = range(&[2, 3]);
        assert_eq!(
            array.data(),
            &NestedArrayData::Branch(vec![
                NestedArrayData::Leaf(vec![0, 1, 2]),
                NestedArrayData::Leaf(vec![3, 4, 5])
            ])
        );
        assert_eq!(array.flatten(), vec![0, 1, 2, 3, 4, 5]);
        let array = range(&[2, 0, 3]);
        assert_eq!(array.num_elements(), 0);
        assert!(array.flatten().is_empty());
        let array = NestedArray::from_flat(vec![7i32], vec![]).unwrap();
        assert_eq!(array.flatten(), vec![7]);
        assert!(NestedArray::from_flat(vec![1i32, 2], vec![3]).is_err());
    }

    #[test]
    fn nested_array_get_1d() {
        let array = range(&[5]);
        let cases: Vec<(Selector, Vec<i32>)> = vec![
            (Selector::Full, vec![0, 1, 2, 3, 4]),
            (slice(Some(1), Some(3), None), vec![1, 2]),
            (slice(Some(0), Some(100), None), vec![0, 1, 2, 3, 4]),
            (slice(Some(5), Some(100), None), vec![]),
            (slice(Some(1), None, Some(2)), vec![1, 3]),
            (slice(Some(5), Some(2), Some(-1)), vec![4, 3]),
            (slice(Some(4), Some(0), Some(-1)), vec![4, 3, 2, 1]),
            (slice(Some(4), Some(0), Some(-2)), vec![4, 2]),
            (slice(None, None, Some(-1)), vec![4, 3, 2, 1, 0]),
            (slice(None, Some(-3), Some(-1)), vec![4, 3]),
            (slice(None, Some(-3), Some(-2)), vec![4]),
        ];
        for (selector, expected) in cases {
            assert_eq!(get_flat(&array, &[selector]).0, expected, "{selector:?}");
        }
        assert_eq!(get_flat(&array, &[Selector::Index(-1)]), (vec![4], vec![]));
    }

    #[test]
    fn nested_array_get_2d() {
        let array = range(&[2, 3]);
        assert_eq!(
            get_flat(&array, &[Selector::Full]),
            (vec![0, 1, 2, 3, 4, 5], vec![2, 3])
        );
        assert_eq!(
            get_flat(&array, &[slice(None, None, Some(-1)), slice(None, None, Some(-1))]),
            (vec![5, 4, 3, 2, 1, 0], vec![2, 3])
        );
        assert_eq!(
            get_flat(&array, &[Selector::Index(1)]),
            (vec![3, 4, 5], vec![3])
        );
        assert_eq!(
            get_flat(&array, &[Selector::Full, Selector::Index(1)]),
            (vec![1, 4], vec![2])
        );
        assert_eq!(
            get_flat(&array, &[slice(Some(0), Some(0), None)]),
            (vec![], vec![0, 3])
        );
        assert_eq!(
            get_flat(&array, &[Selector::Index(1), Selector::Index(2)]),
            (vec![5], vec![])
        );
        assert_eq!(
            get_flat(&array, &[Selector::Ellipsis, Selector::Index(0)]),
            (vec![0, 3], vec![2])
        );
    }

    #[test]
    fn nested_array_set() {
        let mut array = NestedArray::<i32>::zeros(vec![3, 4]);
        array.set([Selector::Index(0)], 1).unwrap();
        array
            .set(
                [Selector::Full, slice(None, None, Some(-3))],
                NestedArray::from_flat(vec![2, 3, 4, 5, 6, 7], vec![3, 2]).unwrap(),
            )
            .unwrap();
        assert_eq!(
            array.flatten(),
            vec![3, 1, 1, 2, 5, 0, 0, 4, 7, 0, 0, 6]
        );

        array.set([Selector::Index(2), Selector::Index(1)], 9).unwrap();
        assert_eq!(array.flatten()[9], 9);

        let result = array.set(
            [Selector::Index(0)],
            NestedArray::from_flat(vec![1, 2], vec![2]).unwrap(),
        );
        assert!(matches!(result, Err(ArrayError::InvalidDataShape { .. })));
    }

    #[test]
    fn nested_array_set_get_roundtrip() {
        let source = range(&[3, 2, 4]);
        let mut array = NestedArray::<i32>::zeros(vec![3, 2, 4]);
        array.set(ArraySelection::all(), source.clone()).unwrap();
        assert_eq!(array, source);
        let ArrayOrScalar::Array(all) = array.get(ArraySelection::all()).unwrap() else {
            panic!("expected an array");
        };
        assert_eq!(all.flatten(), source.flatten());
        let rebuilt = NestedArray::from_flat(all.flatten(), vec![3, 2, 4]).unwrap();
        assert_eq!(rebuilt.flatten(), source.flatten());
    }
}
