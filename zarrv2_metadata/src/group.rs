use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Zarr V2 group metadata, the content of a `.zgroup` document.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct GroupMetadataV2 {
    /// The Zarr format version. Must be `2`.
    pub zarr_format: monostate::MustBe!(2u64),
}

impl Default for GroupMetadataV2 {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupMetadataV2 {
    /// Create Zarr V2 group metadata.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zarr_format: monostate::MustBe!(2u64),
        }
    }

    /// Serialize the metadata as a pretty-printed String of JSON.
    #[must_use]
    pub fn to_string_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_metadata_v2() {
        assert_eq!(GroupMetadataV2::new().to_string(), r#"{"zarr_format":2}"#);
        assert!(serde_json::from_str::<GroupMetadataV2>(r#"{"zarr_format":2}"#).is_ok());
        assert!(serde_json::from_str::<GroupMetadataV2>(r#"{"zarr_format":3}"#).is_err());
    }
}
