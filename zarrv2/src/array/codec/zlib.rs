//! The `zlib` compressor.
//!
//! Applies [zlib](https://datatracker.ietf.org/doc/html/rfc1950) compression.
//!
//! ### Configuration Example
//! ```json
//! {
//!     "id": "zlib",
//!     "level": 1
//! }
//! ```

use std::borrow::Cow;
use std::io::{Cursor, Read};
use std::sync::Arc;

use flate2::bufread::{ZlibDecoder, ZlibEncoder};
use zarrv2_metadata::{Configuration, MetadataV2};

use super::{
    deflate_configuration, BytesToBytesCodecTraits, Codec, CodecError, CodecPlugin,
    CompressionLevel, DeflateCodecConfiguration, PluginCreateError,
};

/// The `zlib` codec `id`.
pub const ZLIB: &str = "zlib";

inventory::submit! {
    CodecPlugin::new(ZLIB, create_codec_zlib)
}

fn create_codec_zlib(metadata: &MetadataV2) -> Result<Codec, PluginCreateError> {
    let configuration = deflate_configuration(metadata)?;
    Ok(Arc::new(ZlibCodec::new(configuration.level)))
}

/// A `zlib` codec implementation.
#[derive(Clone, Debug, Default)]
pub struct ZlibCodec {
    compression_level: CompressionLevel,
}

impl ZlibCodec {
    /// Create a new `zlib` codec.
    #[must_use]
    pub const fn new(compression_level: CompressionLevel) -> Self {
        Self { compression_level }
    }
}

impl BytesToBytesCodecTraits for ZlibCodec {
    fn id(&self) -> &'static str {
        ZLIB
    }

    fn configuration(&self) -> Configuration {
        Configuration::from_typed(&DeflateCodecConfiguration {
            level: self.compression_level,
        })
    }

    fn encode<'a>(&self, decoded_value: Cow<'a, [u8]>) -> Result<Cow<'a, [u8]>, CodecError> {
        let mut encoder = ZlibEncoder::new(
            Cursor::new(decoded_value),
            flate2::Compression::new(self.compression_level.as_u32()),
        );
        let mut out: Vec<u8> = Vec::new();
        encoder.read_to_end(&mut out)?;
        Ok(Cow::Owned(out))
    }

    fn decode<'a>(&self, encoded_value: Cow<'a, [u8]>) -> Result<Cow<'a, [u8]>, CodecError> {
        let mut decoder = ZlibDecoder::new(Cursor::new(encoded_value));
        let mut out: Vec<u8> = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(Cow::Owned(out))
    }
}
