use super::{ArrayError, ArrayValue, DataType};

/// A trait representing an array element type.
///
/// Elements are plain old data with the in-memory layout of their [`DataType`] in native byte order.
pub trait Element:
    bytemuck::Pod + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static
{
    /// The data type of the element.
    const DATA_TYPE: DataType;

    /// Validate the data type.
    ///
    /// # Errors
    /// Returns [`ArrayError::IncompatibleElementType`] if the data type is incompatible with [`Element`].
    fn validate_data_type(data_type: DataType) -> Result<(), ArrayError> {
        if data_type == Self::DATA_TYPE {
            Ok(())
        } else {
            Err(ArrayError::IncompatibleElementType {
                expected: data_type,
                got: Self::DATA_TYPE,
            })
        }
    }
}

macro_rules! impl_element {
    ($raw_type:ty, $data_type:expr) => {
        impl Element for $raw_type {
            const DATA_TYPE: DataType = $data_type;
        }

        impl From<$raw_type> for ArrayValue<$raw_type> {
            fn from(value: $raw_type) -> Self {
                Self::Scalar(value)
            }
        }
    };
}

impl_element!(i8, DataType::Int8);
impl_element!(i16, DataType::Int16);
impl_element!(i32, DataType::Int32);
impl_element!(i64, DataType::Int64);
impl_element!(u8, DataType::UInt8);
impl_element!(u16, DataType::UInt16);
impl_element!(u32, DataType::UInt32);
impl_element!(u64, DataType::UInt64);
impl_element!(half::f16, DataType::Float16);
impl_element!(f32, DataType::Float32);
impl_element!(f64, DataType::Float64);

/// Reinterpret native-endian bytes as elements.
///
/// The bytes need not be aligned.
pub(crate) fn elements_from_bytes<T: Element>(bytes: &[u8]) -> Vec<T> {
    bytemuck::pod_collect_to_vec(bytes)
}

/// Reinterpret elements as native-endian bytes.
pub(crate) fn elements_to_bytes<T: Element>(elements: &[T]) -> &[u8] {
    bytemuck::cast_slice(elements)
}

/// Reverse the byte order of each `element_size` byte element in place.
pub(crate) fn swap_byte_order(bytes: &mut [u8], element_size: usize) {
    if element_size > 1 {
        bytes.chunks_exact_mut(element_size).for_each(<[u8]>::reverse);
    }
}
