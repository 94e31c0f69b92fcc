//! The `gzip` compressor.
//!
//! Applies [gzip](https://datatracker.ietf.org/doc/html/rfc1952) compression.
//!
//! ### Configuration Example
//! ```json
//! {
//!     "id": "gzip",
//!     "level": 1
//! }
//! ```

use std::borrow::Cow;
use std::io::{Cursor, Read};
use std::sync::Arc;

use flate2::bufread::{GzDecoder, GzEncoder};
use zarrv2_metadata::{Configuration, MetadataV2};

use super::{
    deflate_configuration, BytesToBytesCodecTraits, Codec, CodecError, CodecPlugin,
    CompressionLevel, DeflateCodecConfiguration, PluginCreateError,
};

/// The `gzip` codec `id`.
pub const GZIP: &str = "gzip";

inventory::submit! {
    CodecPlugin::new(GZIP, create_codec_gzip)
}

fn create_codec_gzip(metadata: &MetadataV2) -> Result<Codec, PluginCreateError> {
    let configuration = deflate_configuration(metadata)?;
    Ok(Arc::new(GzipCodec::new(configuration.level)))
}

/// A `gzip` codec implementation.
#[derive(Clone, Debug, Default)]
pub struct GzipCodec {
    compression_level: CompressionLevel,
}

impl GzipCodec {
    /// Create a new `gzip` codec.
    #[must_use]
    pub const fn new(compression_level: CompressionLevel) -> Self {
        Self { compression_level }
    }
}

impl BytesToBytesCodecTraits for GzipCodec {
    fn id(&self) -> &'static str {
        GZIP
    }

    fn configuration(&self) -> Configuration {
        Configuration::from_typed(&DeflateCodecConfiguration {
            level: self.compression_level,
        })
    }

    fn encode<'a>(&self, decoded_value: Cow<'a, [u8]>) -> Result<Cow<'a, [u8]>, CodecError> {
        let mut encoder = GzEncoder::new(
            Cursor::new(decoded_value),
            flate2::Compression::new(self.compression_level.as_u32()),
        );
        let mut out: Vec<u8> = Vec::new();
        encoder.read_to_end(&mut out)?;
        Ok(Cow::Owned(out))
    }

    fn decode<'a>(&self, encoded_value: Cow<'a, [u8]>) -> Result<Cow<'a, [u8]>, CodecError> {
        let mut decoder = GzDecoder::new(Cursor::new(encoded_value));
        let mut out: Vec<u8> = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(Cow::Owned(out))
    }
}
