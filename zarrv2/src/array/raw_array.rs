//! A dense array in a single flat buffer.
//!
//! The copy routines here walk a selection one dimension at a time over a buffer and its element strides.
//! A squeezed dimension becomes an offset into the buffer, and the innermost dimension is copied or filled as a contiguous range where both sides allow it.

use crate::indexer::{normalize_selection, ArraySelection, DimSelection, SliceIndices};

use super::{
    array_index, nested_array::check_shape, num_elements, ArrayError, ArrayOrScalar, ArrayShape,
    ArrayValue, Element, NestedArray,
};

/// A dense N-dimensional array stored in row-major order in a flat buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct RawArray<T> {
    shape: ArrayShape,
    strides: Vec<usize>,
    data: Vec<T>,
}

/// The element strides of a row-major array with `shape`.
#[must_use]
pub fn c_order_strides(shape: &[u64]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * array_index(shape[i + 1]);
    }
    strides
}

/// Set the `selection` of `dst` to `value`.
pub fn set_to_scalar<T: Copy>(
    dst: &mut [T],
    dst_strides: &[usize],
    selection: &[DimSelection],
    value: T,
) {
    match selection.split_first() {
        None => dst[0] = value,
        Some((DimSelection::Index(i), rest)) => {
            let offset = dst_strides[0] * array_index(*i);
            set_to_scalar(&mut dst[offset..], &dst_strides[1..], rest, value);
        }
        Some((DimSelection::Slice(slice), rest)) => {
            if slice.length == 0 {
                return;
            }
            let stride = dst_strides[0];
            if rest.is_empty() {
                if slice.is_contiguous() && stride == 1 {
                    let start = array_index(slice.index(0));
                    dst[start..start + array_index(slice.length)].fill(value);
                } else {
                    for i in 0..slice.length {
                        dst[stride * array_index(slice.index(i))] = value;
                    }
                }
            } else {
                for i in 0..slice.length {
                    let offset = stride * array_index(slice.index(i));
                    set_to_scalar(&mut dst[offset..], &dst_strides[1..], rest, value);
                }
            }
        }
    }
}

/// Copy the `src_selection` of `src` into the `dst_selection` of `dst`.
///
/// The selections must select the same shape once squeezed dimensions are removed.
pub fn set_from_chunk_item<T: Copy>(
    (dst, dst_strides, dst_selection): (&mut [T], &[usize], &[DimSelection]),
    (src, src_strides, src_selection): (&[T], &[usize], &[DimSelection]),
) {
    if let Some((DimSelection::Index(i), rest)) = dst_selection.split_first() {
        let offset = dst_strides[0] * array_index(*i);
        return set_from_chunk_item(
            (&mut dst[offset..], &dst_strides[1..], rest),
            (src, src_strides, src_selection),
        );
    }
    if let Some((DimSelection::Index(i), rest)) = src_selection.split_first() {
        let offset = src_strides[0] * array_index(*i);
        return set_from_chunk_item(
            (dst, dst_strides, dst_selection),
            (&src[offset..], &src_strides[1..], rest),
        );
    }

    match (dst_selection.split_first(), src_selection.split_first()) {
        (None, None) => dst[0] = src[0],
        (
            Some((DimSelection::Slice(dst_slice), dst_rest)),
            Some((DimSelection::Slice(src_slice), src_rest)),
        ) => {
            let length = dst_slice.length.min(src_slice.length);
            if length == 0 {
                return;
            }
            let (dst_stride, src_stride) = (dst_strides[0], src_strides[0]);
            if dst_rest.is_empty() && src_rest.is_empty() {
                if dst_slice.is_contiguous()
                    && src_slice.is_contiguous()
                    && dst_stride == 1
                    && src_stride == 1
                {
                    let dst_start = array_index(dst_slice.index(0));
                    let src_start = array_index(src_slice.index(0));
                    let length = array_index(length);
                    dst[dst_start..dst_start + length]
                        .copy_from_slice(&src[src_start..src_start + length]);
                } else {
                    for i in 0..length {
                        dst[dst_stride * array_index(dst_slice.index(i))] =
                            src[src_stride * array_index(src_slice.index(i))];
                    }
                }
            } else {
                for i in 0..length {
                    let dst_offset = dst_stride * array_index(dst_slice.index(i));
                    let src_offset = src_stride * array_index(src_slice.index(i));
                    set_from_chunk_item(
                        (&mut dst[dst_offset..], &dst_strides[1..], dst_rest),
                        (&src[src_offset..], &src_strides[1..], src_rest),
                    );
                }
            }
        }
        // Squeezed dimensions were consumed above, so the selections disagree in dimensionality
        _ => {}
    }
}

/// The selection of every element of an array with `shape`.
pub(crate) fn full_selection(shape: &[u64]) -> Vec<DimSelection> {
    shape
        .iter()
        .map(|&length| DimSelection::Slice(SliceIndices::contiguous(0, length)))
        .collect()
}

impl<T: Element> RawArray<T> {
    /// Create a raw array from elements in row-major order.
    ///
    /// # Errors
    /// Returns [`ArrayError::InvalidElementCount`] if the number of elements does not match `shape`.
    pub fn new(data: Vec<T>, shape: ArrayShape) -> Result<Self, ArrayError> {
        let expected = num_elements(&shape);
        if data.len() as u64 != expected {
            return Err(ArrayError::InvalidElementCount {
                shape,
                expected,
                got: data.len() as u64,
            });
        }
        Ok(Self {
            strides: c_order_strides(&shape),
            shape,
            data,
        })
    }

    /// Create a raw array with every element set to `value`.
    #[must_use]
    pub fn filled(shape: ArrayShape, value: T) -> Self {
        Self {
            strides: c_order_strides(&shape),
            data: vec![value; array_index(num_elements(&shape))],
            shape,
        }
    }

    /// Create a raw array of zeros.
    #[must_use]
    pub fn zeros(shape: ArrayShape) -> Self {
        Self::filled(shape, T::zeroed())
    }

    /// The shape of the array.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// The element strides of each dimension.
    #[must_use]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// The elements in row-major order.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable access to the elements.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut [T], &[usize]) {
        (&mut self.data, &self.strides)
    }

    /// Consume the array and return its elements.
    #[must_use]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Read a selection of the array.
    ///
    /// # Errors
    /// Returns [`ArrayError::IndexingError`] if the selection is invalid.
    pub fn get(
        &self,
        selection: impl Into<ArraySelection>,
    ) -> Result<ArrayOrScalar<Self, T>, ArrayError> {
        let selection = normalize_selection(&selection.into(), &self.shape)?;
        let shape = crate::indexer::selection_shape(&selection);
        let mut out = Self::zeros(shape);
        if selection.iter().all(DimSelection::is_squeezed) {
            set_from_chunk_item(
                (&mut out.data, &[], &[]),
                (&self.data, &self.strides, &selection),
            );
            return Ok(ArrayOrScalar::Scalar(out.data[0]));
        }
        let out_selection = full_selection(&out.shape);
        set_from_chunk_item(
            (&mut out.data, &out.strides, &out_selection),
            (&self.data, &self.strides, &selection),
        );
        Ok(ArrayOrScalar::Array(out))
    }

    /// Write a scalar or an array to a selection of the array.
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
            ArrayValue::Scalar(value) => {
                set_to_scalar(&mut self.data, &self.strides, &selection, value);
            }
            ArrayValue::Raw(value) => {
                check_shape(&selection, value.shape())?;
                self.set_from(&selection, &value);
            }
            ArrayValue::Nested(value) => {
                check_shape(&selection, value.shape())?;
                self.set_from(&selection, &Self::from(value));
            }
        }
        Ok(())
    }

    fn set_from(&mut self, selection: &[DimSelection], value: &Self) {
        let value_selection = full_selection(&value.shape);
        set_from_chunk_item(
            (&mut self.data, &self.strides, selection),
            (&value.data, &value.strides, &value_selection),
        );
    }
}

impl<T: Element> From<NestedArray<T>> for RawArray<T> {
    fn from(array: NestedArray<T>) -> Self {
        let shape = array.shape().to_vec();
        Self {
            strides: c_order_strides(&shape),
            data: array.flatten(),
            shape,
        }
    }
}

impl<T> From<RawArray<T>> for ArrayValue<T> {
    fn from(array: RawArray<T>) -> Self {
        Self::Raw(array)
    }
}
