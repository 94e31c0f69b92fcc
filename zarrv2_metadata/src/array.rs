use derive_more::Display;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::{ArrayShape, ChunkKeySeparator, ChunkShape, Endianness, MetadataV2};

/// Zarr V2 array metadata, the content of a `.zarray` document.
///
/// For example:
/// ```json
/// {
///     "zarr_format": 2,
///     "shape": [10000, 10000],
///     "chunks": [1000, 1000],
///     "dtype": "<f8",
///     "compressor": {
///         "id": "gzip",
///         "level": 1
///     },
///     "fill_value": "NaN",
///     "order": "C",
///     "filters": null,
///     "dimension_separator": "."
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ArrayMetadataV2 {
    /// The Zarr format version. Must be `2`.
    pub zarr_format: monostate::MustBe!(2u64),
    /// The length of each dimension of the array.
    pub shape: ArrayShape,
    /// The length of each dimension of a chunk of the array.
    pub chunks: ChunkShape,
    /// The NumPy data type string, e.g. `<i4`.
    pub dtype: String,
    /// The primary compression codec, or null if chunks are stored raw.
    pub compressor: Option<MetadataV2>,
    /// The value of uninitialised portions of the array, or null.
    pub fill_value: FillValueMetadataV2,
    /// The layout of elements within each chunk.
    pub order: ArrayMetadataV2Order,
    /// Filter codecs, or null.
    #[serde(default, serialize_with = "serialize_v2_filters")]
    pub filters: Option<Vec<MetadataV2>>,
    /// The separator placed between chunk coordinates in chunk keys.
    #[serde(default)]
    pub dimension_separator: ChunkKeySeparator,
}

#[allow(clippy::ref_option)]
fn serialize_v2_filters<S>(
    filters: &Option<Vec<MetadataV2>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match filters.as_ref().filter(|filters| !filters.is_empty()) {
        Some(filters) => serializer.collect_seq(filters),
        None => serializer.serialize_none(),
    }
}

impl ArrayMetadataV2 {
    /// Create Zarr V2 array metadata with C order, no filters, and `.` separated chunk keys.
    #[must_use]
    pub fn new(
        shape: ArrayShape,
        chunks: ChunkShape,
        dtype: impl Into<String>,
        fill_value: FillValueMetadataV2,
        compressor: Option<MetadataV2>,
    ) -> Self {
        Self {
            zarr_format: monostate::MustBe!(2u64),
            shape,
            chunks,
            dtype: dtype.into(),
            compressor,
            fill_value,
            order: ArrayMetadataV2Order::C,
            filters: None,
            dimension_separator: ChunkKeySeparator::Dot,
        }
    }

    /// Set the dimension separator.
    #[must_use]
    pub fn with_dimension_separator(mut self, dimension_separator: ChunkKeySeparator) -> Self {
        self.dimension_separator = dimension_separator;
        self
    }

    /// Serialize the metadata as a pretty-printed String of JSON.
    #[must_use]
    pub fn to_string_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// A data type string without a `<`, `>` or `|` byte order prefix.
#[derive(Debug, Error)]
#[error("invalid data type {_0}, must begin with |, < or >")]
pub struct DataTypeMetadataV2EndiannessError(String);

/// Get the byte order of a Zarr V2 data type string.
///
/// Returns [`None`] for `|` (byte order irrelevant).
///
/// # Errors
/// Returns a [`DataTypeMetadataV2EndiannessError`] if the byte order prefix is invalid.
pub fn data_type_metadata_v2_to_endianness(
    data_type: &str,
) -> Result<Option<Endianness>, DataTypeMetadataV2EndiannessError> {
    match data_type.chars().next() {
        Some('|') => Ok(None),
        Some('<') => Ok(Some(Endianness::Little)),
        Some('>') => Ok(Some(Endianness::Big)),
        _ => Err(DataTypeMetadataV2EndiannessError(data_type.to_string())),
    }
}

/// Zarr V2 fill value metadata.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FillValueMetadataV2 {
    /// No fill value.
    Null,
    /// NaN (not-a-number).
    NaN,
    /// Positive infinity.
    Infinity,
    /// Negative infinity.
    NegInfinity,
    /// A number.
    Number(serde_json::Number),
}

impl From<i64> for FillValueMetadataV2 {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<f64> for FillValueMetadataV2 {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Self::NaN
        } else if value == f64::INFINITY {
            Self::Infinity
        } else if value == f64::NEG_INFINITY {
            Self::NegInfinity
        } else {
            serde_json::Number::from_f64(value).map_or(Self::Null, Self::Number)
        }
    }
}

impl<'de> serde::Deserialize<'de> for FillValueMetadataV2 {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum FillValueMetadataV2Type {
            String(String),
            Number(serde_json::Number),
            Null,
        }
        match FillValueMetadataV2Type::deserialize(d)? {
            FillValueMetadataV2Type::String(string) => match string.as_str() {
                "NaN" => Ok(Self::NaN),
                "Infinity" => Ok(Self::Infinity),
                "-Infinity" => Ok(Self::NegInfinity),
                _ => Err(serde::de::Error::custom(format!(
                    "unsupported fill value {string}"
                ))),
            },
            FillValueMetadataV2Type::Number(number) => Ok(Self::Number(number)),
            FillValueMetadataV2Type::Null => Ok(Self::Null),
        }
    }
}

impl Serialize for FillValueMetadataV2 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::NaN => serializer.serialize_str("NaN"),
            Self::Infinity => serializer.serialize_str("Infinity"),
            Self::NegInfinity => serializer.serialize_str("-Infinity"),
            Self::Number(number) => number.serialize(serializer),
        }
    }
}

/// The layout of elements within a chunk.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ArrayMetadataV2Order {
    /// Row-major order. The last dimension varies fastest.
    #[default]
    C,
    /// Column-major order. The first dimension varies fastest.
    F,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_metadata_v2() -> Result<(), Box<dyn std::error::Error>> {
        let json = r#"
            {
                "chunks": [1000, 1000],
                "compressor": {
                    "id": "gzip",
                    "level": 5
                },
                "dtype": ">f8",
                "fill_value": "NaN",
                "filters": null,
                "order": "C",
                "shape": [10000, 10000],
                "zarr_format": 2
            }"#;
        let metadata: ArrayMetadataV2 = serde_json::from_str(json)?;
        assert_eq!(metadata.shape, vec![10000, 10000]);
        assert_eq!(metadata.chunks.to_array_shape(), vec![1000, 1000]);
        assert_eq!(metadata.dimension_separator, ChunkKeySeparator::Dot);
        assert_eq!(metadata.fill_value, FillValueMetadataV2::NaN);
        assert_eq!(metadata.compressor.as_ref().map(MetadataV2::id), Some("gzip"));
        assert_eq!(
            data_type_metadata_v2_to_endianness(&metadata.dtype)?,
            Some(Endianness::Big)
        );
        Ok(())
    }

    #[test]
    fn array_metadata_v2_serialize() {
        let mut metadata = ArrayMetadataV2::new(
            vec![8, 8],
            vec![4, 4].try_into().unwrap(),
            "<i4",
            FillValueMetadataV2::from(0i64),
            None,
        )
        .with_dimension_separator(ChunkKeySeparator::Slash);
        metadata.filters = Some(vec![]);
        assert_eq!(
            metadata.to_string(),
            r#"{"zarr_format":2,"shape":[8,8],"chunks":[4,4],"dtype":"<i4","compressor":null,"fill_value":0,"order":"C","filters":null,"dimension_separator":"/"}"#
        );
    }

    #[test]
    fn array_metadata_v2_invalid() {
        let json = r#"{"zarr_format":3,"shape":[1],"chunks":[1],"dtype":"<i4","compressor":null,"fill_value":0,"order":"C","filters":null}"#;
        assert!(serde_json::from_str::<ArrayMetadataV2>(json).is_err());
        let json = r#"{"zarr_format":2,"shape":[1],"chunks":[0],"dtype":"<i4","compressor":null,"fill_value":0,"order":"C","filters":null}"#;
        assert!(serde_json::from_str::<ArrayMetadataV2>(json).is_err());
    }

    #[test]
    fn fill_value_metadata_v2() {
        for (json, fill_value) in [
            ("null", FillValueMetadataV2::Null),
            (r#""NaN""#, FillValueMetadataV2::NaN),
            (r#""Infinity""#, FillValueMetadataV2::Infinity),
            (r#""-Infinity""#, FillValueMetadataV2::NegInfinity),
            ("-3", FillValueMetadataV2::from(-3i64)),
            ("1.5", FillValueMetadataV2::from(1.5)),
        ] {
            assert_eq!(
                serde_json::from_str::<FillValueMetadataV2>(json).unwrap(),
                fill_value
            );
            assert_eq!(serde_json::to_string(&fill_value).unwrap(), json);
        }
        assert!(serde_json::from_str::<FillValueMetadataV2>(r#""abc""#).is_err());
        assert_eq!(FillValueMetadataV2::from(f64::NAN), FillValueMetadataV2::NaN);
    }
}
