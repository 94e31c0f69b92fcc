//! Chunk compressors.
//!
//! A Zarr V2 array has at most one compressor, identified in the array metadata by its `id`.
//! Built-in compressors:
//!  - `gzip` (feature `gzip`): [`gzip::GzipCodec`],
//!  - `zlib` (feature `zlib`): [`zlib::ZlibCodec`].
//!
//! Further compressors can be registered with [`inventory::submit!`] and a [`CodecPlugin`].

#[cfg(feature = "gzip")]
pub mod gzip;
#[cfg(feature = "zlib")]
pub mod zlib;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use zarrv2_codec::{
    create_codec, registered_codec_ids, BytesToBytesCodecTraits, Codec, CodecError, CodecPlugin,
    PluginCreateError,
};

/// A deflate compression level, an integer from 0 to 9.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq, Display)]
#[serde(try_from = "u32", into = "u32")]
pub struct CompressionLevel(u32);

/// An invalid compression level.
#[derive(Clone, Copy, Debug, Error)]
#[error("invalid compression level {_0}, must be 0-9")]
pub struct CompressionLevelError(u32);

impl Default for CompressionLevel {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u32> for CompressionLevel {
    type Error = CompressionLevelError;

    fn try_from(level: u32) -> Result<Self, Self::Error> {
        if level <= 9 {
            Ok(Self(level))
        } else {
            Err(CompressionLevelError(level))
        }
    }
}

impl From<CompressionLevel> for u32 {
    fn from(level: CompressionLevel) -> Self {
        level.0
    }
}

impl CompressionLevel {
    /// The level as a [`u32`].
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

/// The configuration of a deflate based codec (`gzip` or `zlib`).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DeflateCodecConfiguration {
    /// The compression level.
    #[serde(default)]
    pub level: CompressionLevel,
}

#[cfg(any(feature = "gzip", feature = "zlib"))]
fn deflate_configuration(
    metadata: &zarrv2_metadata::MetadataV2,
) -> Result<DeflateCodecConfiguration, PluginCreateError> {
    metadata
        .to_typed_configuration::<DeflateCodecConfiguration>()
        .map_err(|err| PluginCreateError::ConfigurationInvalid {
            id: metadata.id().to_string(),
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_level() {
        assert_eq!(CompressionLevel::default().as_u32(), 1);
        assert!(CompressionLevel::try_from(9).is_ok());
        assert!(CompressionLevel::try_from(10).is_err());
        let configuration: DeflateCodecConfiguration = serde_json::from_str("{}").unwrap();
        assert_eq!(configuration.level.as_u32(), 1);
        assert!(serde_json::from_str::<DeflateCodecConfiguration>(r#"{"level": 12}"#).is_err());
    }
}
