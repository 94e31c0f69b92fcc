//! Zarr V2 metadata support for the `zarrv2` crate.
//!
//! Models the JSON documents stored alongside a Zarr V2 hierarchy:
//!  - `.zarray`: [`ArrayMetadataV2`],
//!  - `.zgroup`: [`GroupMetadataV2`],
//!  - `.zattrs`: a plain JSON object, see [`AttributesMetadata`].
//!
//! Codec metadata (the array `compressor`) is a [`MetadataV2`], an `id` with flattened configuration.

mod array;
mod chunk_key_separator;
mod chunk_shape;
mod configuration;
mod endianness;
mod group;
mod metadata_v2;

pub use array::{
    data_type_metadata_v2_to_endianness, ArrayMetadataV2, ArrayMetadataV2Order,
    DataTypeMetadataV2EndiannessError, FillValueMetadataV2,
};
pub use chunk_key_separator::ChunkKeySeparator;
pub use chunk_shape::{ChunkShape, ChunkShapeError};
pub use configuration::Configuration;
pub use endianness::Endianness;
pub use group::GroupMetadataV2;
pub use metadata_v2::MetadataV2;

/// An array shape.
pub type ArrayShape = Vec<u64>;

/// User attributes, the content of a `.zattrs` document.
pub type AttributesMetadata = serde_json::Map<String, serde_json::Value>;

/// The key of array metadata relative to the array prefix.
pub const ARRAY_META_KEY: &str = ".zarray";

/// The key of group metadata relative to the group prefix.
pub const GROUP_META_KEY: &str = ".zgroup";

/// The key of user attributes relative to a node prefix.
pub const ATTRS_META_KEY: &str = ".zattrs";
