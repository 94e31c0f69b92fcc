use std::sync::Arc;

use derive_more::{Deref, From, Into};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// The configuration of a codec, all metadata fields other than `id`.
#[derive(Default, Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Deref, From, Into)]
pub struct Configuration(serde_json::Map<String, serde_json::Value>);

impl Configuration {
    /// Convert to a typed configuration.
    ///
    /// # Errors
    /// Returns a [`serde_json`] error if the configuration is not compatible with `TConfiguration`.
    pub fn to_typed<TConfiguration: DeserializeOwned>(
        &self,
    ) -> Result<TConfiguration, Arc<serde_json::Error>> {
        serde_json::from_value(serde_json::Value::Object(self.0.clone())).map_err(Arc::new)
    }

    /// Create a configuration from a serializable value.
    ///
    /// Values that do not serialize to a JSON object produce an empty configuration.
    #[must_use]
    pub fn from_typed<TConfiguration: Serialize>(configuration: &TConfiguration) -> Self {
        match serde_json::to_value(configuration) {
            Ok(serde_json::Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }
}
