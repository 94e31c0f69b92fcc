use derive_more::Display;
use thiserror::Error;
use zarrv2_metadata::{data_type_metadata_v2_to_endianness, Endianness};

/// A numeric data type supported by Zarr V2 arrays.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum DataType {
    /// `i1` Integer in `[-2^7, 2^7-1]`.
    #[display("int8")]
    Int8,
    /// `i2` Integer in `[-2^15, 2^15-1]`.
    #[display("int16")]
    Int16,
    /// `i4` Integer in `[-2^31, 2^31-1]`.
    #[display("int32")]
    Int32,
    /// `i8` Integer in `[-2^63, 2^63-1]`.
    #[display("int64")]
    Int64,
    /// `u1` Integer in `[0, 2^8-1]`.
    #[display("uint8")]
    UInt8,
    /// `u2` Integer in `[0, 2^16-1]`.
    #[display("uint16")]
    UInt16,
    /// `u4` Integer in `[0, 2^32-1]`.
    #[display("uint32")]
    UInt32,
    /// `u8` Integer in `[0, 2^64-1]`.
    #[display("uint64")]
    UInt64,
    /// `f2` IEEE 754 half-precision floating point.
    #[display("float16")]
    Float16,
    /// `f4` IEEE 754 single-precision floating point.
    #[display("float32")]
    Float32,
    /// `f8` IEEE 754 double-precision floating point.
    #[display("float64")]
    Float64,
}

/// An unsupported data type error.
#[derive(Clone, Debug, Error)]
#[error("unsupported data type {_0}")]
pub struct UnsupportedDataTypeError(String);

impl DataType {
    /// The size of an element in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 | Self::Float16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Returns true if the data type is a floating point type.
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float16 | Self::Float32 | Self::Float64)
    }

    /// Returns true if the data type is a signed type.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        !matches!(
            self,
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64
        )
    }

    const fn type_code(&self) -> &'static str {
        match self {
            Self::Int8 => "i1",
            Self::Int16 => "i2",
            Self::Int32 => "i4",
            Self::Int64 => "i8",
            Self::UInt8 => "u1",
            Self::UInt16 => "u2",
            Self::UInt32 => "u4",
            Self::UInt64 => "u8",
            Self::Float16 => "f2",
            Self::Float32 => "f4",
            Self::Float64 => "f8",
        }
    }

    /// Parse a NumPy data type string, e.g. `<i4` or `|u1`.
    ///
    /// Returns the data type and its byte order, [`None`] if the byte order is irrelevant (`|`).
    ///
    /// # Errors
    /// Returns an [`UnsupportedDataTypeError`] if the string is not a supported data type.
    pub fn from_metadata(
        dtype: &str,
    ) -> Result<(Self, Option<Endianness>), UnsupportedDataTypeError> {
        let unsupported = || UnsupportedDataTypeError(dtype.to_string());
        let endianness = data_type_metadata_v2_to_endianness(dtype).map_err(|_| unsupported())?;
        let data_type = match &dtype[1..] {
            "i1" => Self::Int8,
            "i2" => Self::Int16,
            "i4" => Self::Int32,
            "i8" => Self::Int64,
            "u1" => Self::UInt8,
            "u2" => Self::UInt16,
            "u4" => Self::UInt32,
            "u8" => Self::UInt64,
            "f2" => Self::Float16,
            "f4" => Self::Float32,
            "f8" => Self::Float64,
            _ => return Err(unsupported()),
        };
        if endianness.is_none() && data_type.size() > 1 {
            // Multi-byte elements need a byte order
            return Err(unsupported());
        }
        Ok((data_type, endianness))
    }

    /// Create the NumPy data type string for this data type with `endianness`.
    ///
    /// Single byte types are always written with `|`.
    #[must_use]
    pub fn to_metadata(&self, endianness: Endianness) -> String {
        let prefix = if self.size() == 1 {
            '|'
        } else {
            match endianness {
                Endianness::Little => '<',
                Endianness::Big => '>',
            }
        };
        format!("{prefix}{}", self.type_code())
    }
}
