//! Convenience functions for creating arrays.
//!
//! Each function initialises an array configured by an [`ArrayBuilder`] with [`ArrayBuilder::create`], overriding the fill value or data.
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # use std::sync::Arc;
//! use zarrv2::array::{ArrayBuilder, DataType};
//! use zarrv2::indexer::ArraySelection;
//! # let store = Arc::new(zarrv2::storage::store::MemoryStore::new());
//! let mut builder = ArrayBuilder::new(vec![4, 4], DataType::Int16);
//! builder.chunk_shape(vec![2, 2]);
//! let array = zarrv2::creation::ones(store, "ones", &builder)?;
//! assert_eq!(array.get::<i16>(ArraySelection::all())?.array().unwrap().flatten(), vec![1; 16]);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use zarrv2_storage::{ReadableStorageTraits, WritableStorageTraits};

use crate::{
    array::{
        Array, ArrayBuilder, ArrayCreateError, ArrayError, Element, FillValueMetadataV2,
        NestedArray,
    },
    indexer::ArraySelection,
};

/// Create an array configured by `builder`.
///
/// # Errors
/// See [`ArrayBuilder::create`].
pub fn create<TStorage: ?Sized + ReadableStorageTraits + WritableStorageTraits>(
    storage: Arc<TStorage>,
    path: &str,
    builder: &ArrayBuilder,
) -> Result<Array<TStorage>, ArrayCreateError> {
    builder.create(storage, path)
}

/// Create an array with no fill value, so uninitialised elements read as zero.
///
/// # Errors
/// See [`ArrayBuilder::create`].
pub fn empty<TStorage: ?Sized + ReadableStorageTraits + WritableStorageTraits>(
    storage: Arc<TStorage>,
    path: &str,
    builder: &ArrayBuilder,
) -> Result<Array<TStorage>, ArrayCreateError> {
    full(storage, path, FillValueMetadataV2::Null, builder)
}

/// Create an array with a fill value of zero.
///
/// # Errors
/// See [`ArrayBuilder::create`].
pub fn zeros<TStorage: ?Sized + ReadableStorageTraits + WritableStorageTraits>(
    storage: Arc<TStorage>,
    path: &str,
    builder: &ArrayBuilder,
) -> Result<Array<TStorage>, ArrayCreateError> {
    full(storage, path, 0i64, builder)
}

/// Create an array with a fill value of one.
///
/// # Errors
/// See [`ArrayBuilder::create`].
pub fn ones<TStorage: ?Sized + ReadableStorageTraits + WritableStorageTraits>(
    storage: Arc<TStorage>,
    path: &str,
    builder: &ArrayBuilder,
) -> Result<Array<TStorage>, ArrayCreateError> {
    full(storage, path, 1i64, builder)
}

/// Create an array with `fill_value` used for uninitialised elements.
///
/// # Errors
/// See [`ArrayBuilder::create`].
pub fn full<TStorage: ?Sized + ReadableStorageTraits + WritableStorageTraits>(
    storage: Arc<TStorage>,
    path: &str,
    fill_value: impl Into<FillValueMetadataV2>,
    builder: &ArrayBuilder,
) -> Result<Array<TStorage>, ArrayCreateError> {
    builder.clone().fill_value(fill_value).create(storage, path)
}

/// Create an array holding `data`.
///
/// The shape and data type of `builder` are replaced by those of `data`.
/// The data is written even if `builder` is read only, and the array is read only afterwards.
///
/// # Errors
/// Returns an [`ArrayError`] if the array cannot be created or written.
pub fn array<T: Element, TStorage: ?Sized + ReadableStorageTraits + WritableStorageTraits + 'static>(
    storage: Arc<TStorage>,
    path: &str,
    data: NestedArray<T>,
    builder: &ArrayBuilder,
) -> Result<Array<TStorage>, ArrayError> {
    let mut array = builder
        .clone()
        .shape(data.shape().to_vec())
        .data_type(T::DATA_TYPE)
        .read_only(false)
        .create(storage, path)?;
    array.set(ArraySelection::all(), data)?;
    array.set_read_only(builder.read_only);
    Ok(array)
}

#[cfg(test)]
mod tests {
    use zarrv2_storage::store::MemoryStore;

    use super::*;
    use crate::array::{DataType, FillValue};

    #[test]
    fn creation_fill_values() {
        let store = Arc::new(MemoryStore::new());
        let builder = ArrayBuilder::new(vec![3], DataType::Float32);

        let array = empty(store.clone(), "empty", &builder).unwrap();
        assert_eq!(array.fill_value(), None);
        let array = zeros(store.clone(), "zeros", &builder).unwrap();
        assert_eq!(array.fill_value(), Some(FillValue::from_element(0f32)));
        let array = ones(store.clone(), "ones", &builder).unwrap();
        assert_eq!(array.fill_value(), Some(FillValue::from_element(1f32)));
        let array = full(store.clone(), "full", f64::NAN, &builder).unwrap();
        let fill_value: f32 = array.fill_value().unwrap().to_element().unwrap();
        assert!(fill_value.is_nan());
        let array = create(store, "create", &builder).unwrap();
        assert_eq!(array.fill_value(), Some(FillValue::from_element(0f32)));
    }

    #[test]
    fn creation_array() {
        let store = Arc::new(MemoryStore::new());
        let data = NestedArray::from_flat((0u16..6).collect(), vec![2, 3]).unwrap();
        let mut builder = ArrayBuilder::new(vec![], DataType::Int8);
        builder.chunk_shape(vec![1, 2]).read_only(true);

        let array = array(store, "data", data.clone(), &builder).unwrap();
        assert!(array.read_only());
        assert_eq!(array.data_type(), DataType::UInt16);
        assert_eq!(array.shape(), vec![2, 3]);
        assert_eq!(array.nchunks(), 4);
        assert_eq!(
            array.get::<u16>(ArraySelection::all()).unwrap().array(),
            Some(data)
        );
        assert!(matches!(
            array.set(ArraySelection::all(), 1u16),
            Err(ArrayError::ReadOnly)
        ));
    }
}
