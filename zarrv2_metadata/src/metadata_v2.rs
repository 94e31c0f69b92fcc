use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::Configuration;

/// Zarr V2 codec metadata, an `id` with flattened configuration.
///
/// For example:
/// ```json
/// {
///     "id": "gzip",
///     "level": 5
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
pub struct MetadataV2 {
    id: String,
    #[serde(flatten)]
    configuration: Configuration,
}

impl MetadataV2 {
    /// Create codec metadata from an `id` and configuration.
    #[must_use]
    pub fn new(id: impl Into<String>, configuration: Configuration) -> Self {
        Self {
            id: id.into(),
            configuration,
        }
    }

    /// Return the value of the `id` field.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the configuration, which includes all fields excluding the `id`.
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Try and convert the configuration to a specific deserializable configuration.
    ///
    /// # Errors
    /// Returns a [`serde_json`] error if the metadata cannot be converted.
    pub fn to_typed_configuration<TConfiguration: DeserializeOwned>(
        &self,
    ) -> Result<TConfiguration, std::sync::Arc<serde_json::Error>> {
        self.configuration.to_typed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_v2_flattened() {
        let metadata: MetadataV2 = serde_json::from_str(r#"{"id":"zlib","level":3}"#).unwrap();
        assert_eq!(metadata.id(), "zlib");
        assert_eq!(
            metadata.configuration().get("level"),
            Some(&serde_json::Value::from(3))
        );
        assert_eq!(
            serde_json::to_string(&metadata).unwrap(),
            r#"{"id":"zlib","level":3}"#
        );
    }
}
