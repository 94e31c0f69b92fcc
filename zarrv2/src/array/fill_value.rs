use half::f16;
use zarrv2_metadata::FillValueMetadataV2;

use super::{elements_from_bytes, elements_to_bytes, ArrayCreateError, DataType, Element};

/// The fill value of an array, a single element in native byte order.
///
/// Chunks that have never been written read as the fill value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FillValue(Vec<u8>);

impl FillValue {
    /// Create a fill value from native-endian element bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Create a fill value from an element.
    #[must_use]
    pub fn from_element<T: Element>(element: T) -> Self {
        Self(elements_to_bytes(&[element]).to_vec())
    }

    /// The native-endian bytes of the fill value.
    #[must_use]
    pub fn as_ne_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The size of the fill value in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Interpret the fill value as an element.
    ///
    /// Returns [`None`] if the size of `T` does not match the fill value.
    #[must_use]
    pub fn to_element<T: Element>(&self) -> Option<T> {
        (self.0.len() == size_of::<T>())
            .then(|| elements_from_bytes::<T>(&self.0).first().copied())
            .flatten()
    }

    /// Returns true if every byte of the fill value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&byte| byte == 0)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn int_fill_value<T>(number: &serde_json::Number) -> Option<T>
where
    T: Element + TryFrom<i64> + TryFrom<u64>,
{
    if let Some(value) = number.as_i64() {
        T::try_from(value).ok()
    } else if let Some(value) = number.as_u64() {
        T::try_from(value).ok()
    } else {
        // Integral floats such as `0.0` are accepted
        let value = number.as_f64()?;
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            T::try_from(value as i64).ok()
        } else {
            None
        }
    }
}

/// Convert fill value metadata to a [`FillValue`] of `data_type`.
///
/// Returns `Ok(None)` for a null fill value.
///
/// # Errors
/// Returns [`ArrayCreateError::InvalidFillValueMetadata`] if the fill value metadata is incompatible with the data type.
#[allow(clippy::cast_possible_truncation)]
pub fn fill_value_from_metadata(
    data_type: DataType,
    metadata: &FillValueMetadataV2,
) -> Result<Option<FillValue>, ArrayCreateError> {
    let float = |value: f64| match data_type {
        DataType::Float16 => Some(FillValue::from_element(f16::from_f64(value))),
        DataType::Float32 => Some(FillValue::from_element(value as f32)),
        DataType::Float64 => Some(FillValue::from_element(value)),
        _ => None,
    };
    let fill_value = match metadata {
        FillValueMetadataV2::Null => return Ok(None),
        FillValueMetadataV2::NaN => float(f64::NAN),
        FillValueMetadataV2::Infinity => float(f64::INFINITY),
        FillValueMetadataV2::NegInfinity => float(f64::NEG_INFINITY),
        FillValueMetadataV2::Number(number) => match data_type {
            DataType::Int8 => int_fill_value::<i8>(number).map(FillValue::from_element),
            DataType::Int16 => int_fill_value::<i16>(number).map(FillValue::from_element),
            DataType::Int32 => int_fill_value::<i32>(number).map(FillValue::from_element),
            DataType::Int64 => int_fill_value::<i64>(number).map(FillValue::from_element),
            DataType::UInt8 => int_fill_value::<u8>(number).map(FillValue::from_element),
            DataType::UInt16 => int_fill_value::<u16>(number).map(FillValue::from_element),
            DataType::UInt32 => int_fill_value::<u32>(number).map(FillValue::from_element),
            DataType::UInt64 => int_fill_value::<u64>(number).map(FillValue::from_element),
            DataType::Float16 | DataType::Float32 | DataType::Float64 => {
                number.as_f64().and_then(float)
            }
        },
    };
    fill_value
        .map(Some)
        .ok_or_else(|| ArrayCreateError::InvalidFillValueMetadata {
            data_type,
            fill_value: metadata.clone(),
        })
}

fn int_fill_value_metadata<T: Element + Into<i64>>(fill_value: &FillValue) -> FillValueMetadataV2 {
    fill_value
        .to_element::<T>()
        .map_or(FillValueMetadataV2::Null, |value| {
            FillValueMetadataV2::from(Into::<i64>::into(value))
        })
}

/// Convert a [`FillValue`] of `data_type` to fill value metadata.
///
/// Returns [`FillValueMetadataV2::Null`] if the fill value size does not match the data type.
#[must_use]
pub fn fill_value_to_metadata(
    data_type: DataType,
    fill_value: Option<&FillValue>,
) -> FillValueMetadataV2 {
    let Some(fill_value) = fill_value else {
        return FillValueMetadataV2::Null;
    };
    match data_type {
        DataType::Int8 => int_fill_value_metadata::<i8>(fill_value),
        DataType::Int16 => int_fill_value_metadata::<i16>(fill_value),
        DataType::Int32 => int_fill_value_metadata::<i32>(fill_value),
        DataType::Int64 => int_fill_value_metadata::<i64>(fill_value),
        DataType::UInt8 => int_fill_value_metadata::<u8>(fill_value),
        DataType::UInt16 => int_fill_value_metadata::<u16>(fill_value),
        DataType::UInt32 => int_fill_value_metadata::<u32>(fill_value),
        DataType::UInt64 => fill_value
            .to_element::<u64>()
            .map_or(FillValueMetadataV2::Null, |value| {
                FillValueMetadataV2::Number(value.into())
            }),
        DataType::Float16 => fill_value
            .to_element::<f16>()
            .map_or(FillValueMetadataV2::Null, |value| f64::from(value).into()),
        DataType::Float32 => fill_value
            .to_element::<f32>()
            .map_or(FillValueMetadataV2::Null, |value| f64::from(value).into()),
        DataType::Float64 => fill_value
            .to_element::<f64>()
            .map_or(FillValueMetadataV2::Null, Into::into),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_value_from_metadata_numbers() {
        let fill_value = fill_value_from_metadata(DataType::Int32, &(-3i64).into())
            .unwrap()
            .unwrap();
        assert_eq!(fill_value.to_element::<i32>(), Some(-3));
        assert_eq!(fill_value.size(), 4);

        let fill_value = fill_value_from_metadata(DataType::UInt8, &FillValueMetadataV2::Number(
            serde_json::Number::from_f64(7.0).unwrap(),
        ))
        .unwrap()
        .unwrap();
        assert_eq!(fill_value.to_element::<u8>(), Some(7));

        let fill_value = fill_value_from_metadata(DataType::Float32, &0.5f64.into())
            .unwrap()
            .unwrap();
        assert_eq!(fill_value.to_element::<f32>(), Some(0.5));

        assert!(fill_value_from_metadata(DataType::UInt8, &256i64.into()).is_err());
        assert!(fill_value_from_metadata(DataType::UInt8, &(-1i64).into()).is_err());
        assert!(fill_value_from_metadata(DataType::Int32, &0.5f64.into()).is_err());
    }

    #[test]
    fn fill_value_from_metadata_special() {
        assert!(fill_value_from_metadata(DataType::Int32, &FillValueMetadataV2::Null)
            .unwrap()
            .is_none());
        let nan = fill_value_from_metadata(DataType::Float64, &FillValueMetadataV2::NaN)
            .unwrap()
            .unwrap();
        assert!(nan.to_element::<f64>().unwrap().is_nan());
        let inf = fill_value_from_metadata(DataType::Float16, &FillValueMetadataV2::NegInfinity)
            .unwrap()
            .unwrap();
        assert_eq!(inf.to_element::<f16>(), Some(f16::NEG_INFINITY));
        assert!(fill_value_from_metadata(DataType::Int32, &FillValueMetadataV2::NaN).is_err());
    }

    #[test]
    fn fill_value_to_metadata_roundtrip() {
        assert_eq!(
            fill_value_to_metadata(DataType::Int16, Some(&FillValue::from_element(-2i16))),
            FillValueMetadataV2::from(-2i64)
        );
        assert_eq!(
            fill_value_to_metadata(DataType::Float32, Some(&FillValue::from_element(f32::NAN))),
            FillValueMetadataV2::NaN
        );
        assert_eq!(
            fill_value_to_metadata(DataType::UInt32, Some(&FillValue::from_element(7u32))),
            FillValueMetadataV2::from(7i64)
        );
        assert_eq!(
            fill_value_to_metadata(DataType::UInt8, Some(&FillValue::from_element(7u32))),
            FillValueMetadataV2::Null
        );
        assert_eq!(
            fill_value_to_metadata(DataType::UInt64, None),
            FillValueMetadataV2::Null
        );
        assert!(FillValue::from_element(0u16).is_zero());
    }
}
