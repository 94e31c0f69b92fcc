//! The codec API for the `zarrv2` crate.
//!
//! A Zarr V2 array has at most one `compressor`, a codec that maps the raw bytes of a chunk to encoded bytes and back.
//! Codecs implement [`BytesToBytesCodecTraits`] and are resolved from their [`MetadataV2`] `id` through plugins registered with [`inventory`].
//!
//! ### Registering a codec
//! ```rust,ignore
//! inventory::submit! {
//!     CodecPlugin::new("gzip", create_codec_gzip)
//! }
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use thiserror::Error;
use zarrv2_metadata::{Configuration, MetadataV2};

/// A bytes to bytes codec.
pub trait BytesToBytesCodecTraits: std::fmt::Debug + Send + Sync {
    /// The codec `id` written to array metadata.
    fn id(&self) -> &'static str;

    /// The codec configuration, all metadata fields other than `id`.
    fn configuration(&self) -> Configuration;

    /// Encode chunk bytes.
    ///
    /// # Errors
    /// Returns [`CodecError`] if a codec fails.
    fn encode<'a>(&self, decoded_value: Cow<'a, [u8]>) -> Result<Cow<'a, [u8]>, CodecError>;

    /// Decode chunk bytes.
    ///
    /// # Errors
    /// Returns [`CodecError`] if a codec fails.
    fn decode<'a>(&self, encoded_value: Cow<'a, [u8]>) -> Result<Cow<'a, [u8]>, CodecError>;

    /// Create the codec metadata.
    fn create_metadata(&self) -> MetadataV2 {
        MetadataV2::new(self.id(), self.configuration())
    }
}

/// A shared codec.
pub type Codec = Arc<dyn BytesToBytesCodecTraits>;

/// A codec plugin.
pub struct CodecPlugin {
    id: &'static str,
    create_fn: fn(metadata: &MetadataV2) -> Result<Codec, PluginCreateError>,
}
inventory::collect!(CodecPlugin);

impl CodecPlugin {
    /// Create a new plugin for registration.
    pub const fn new(
        id: &'static str,
        create_fn: fn(metadata: &MetadataV2) -> Result<Codec, PluginCreateError>,
    ) -> Self {
        Self { id, create_fn }
    }

    /// Returns true if this plugin is associated with `id`.
    #[must_use]
    pub fn match_id(&self, id: &str) -> bool {
        self.id == id
    }

    /// Create a codec from metadata.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if the configuration is invalid.
    pub fn create(&self, metadata: &MetadataV2) -> Result<Codec, PluginCreateError> {
        (self.create_fn)(metadata)
    }
}

/// Create a codec from metadata using the registered [`CodecPlugin`]s.
///
/// # Errors
/// Returns [`PluginCreateError::Unsupported`] if no plugin is registered for the metadata `id`,
/// or another [`PluginCreateError`] if the plugin rejects the configuration.
pub fn create_codec(metadata: &MetadataV2) -> Result<Codec, PluginCreateError> {
    inventory::iter::<CodecPlugin>
        .into_iter()
        .find(|plugin| plugin.match_id(metadata.id()))
        .ok_or_else(|| PluginCreateError::Unsupported {
            id: metadata.id().to_string(),
        })?
        .create(metadata)
}

/// Returns the `id` of every registered codec.
#[must_use]
pub fn registered_codec_ids() -> Vec<&'static str> {
    inventory::iter::<CodecPlugin>
        .into_iter()
        .map(|plugin| plugin.id)
        .collect()
}

/// A codec plugin creation error.
#[derive(Clone, Debug, Error)]
pub enum PluginCreateError {
    /// No plugin is registered for the codec `id`.
    #[error("codec {id} is not supported")]
    Unsupported {
        /// The codec `id`.
        id: String,
    },
    /// The codec configuration is invalid.
    #[error("codec {id} configuration is invalid: {reason}")]
    ConfigurationInvalid {
        /// The codec `id`.
        id: String,
        /// The reason the configuration is invalid.
        reason: String,
    },
}

/// A codec error.
#[derive(Clone, Debug, Error)]
pub enum CodecError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] Arc<std::io::Error>),
    /// Any other error.
    #[error("{_0}")]
    Other(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::IOError(Arc::new(err))
    }
}

impl From<&str> for CodecError {
    fn from(err_string: &str) -> Self {
        Self::Other(err_string.to_string())
    }
}

impl From<String> for CodecError {
    fn from(err_string: String) -> Self {
        Self::Other(err_string)
    }
}
