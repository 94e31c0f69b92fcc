//! Zarr hierarchy node paths.
//!
//! A node path is a normalised store path: segments separated by `/`, with no leading or trailing `/`.
//! The root node has the empty path.

use derive_more::Display;
use thiserror::Error;
use zarrv2_metadata::{ARRAY_META_KEY, ATTRS_META_KEY, GROUP_META_KEY};
use zarrv2_storage::{ReadableStorageTraits, StorageError, StoreKey, StorePrefix};

/// A Zarr hierarchy node path.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display)]
pub struct NodePath(String);

/// An invalid node path.
#[derive(Clone, Debug, Error)]
#[error("invalid node path {0}")]
pub struct NodePathError(String);

/// Normalise a store path.
///
/// Backslashes are replaced with `/`, leading and trailing `/` are removed, and repeated `/` are collapsed.
///
/// # Errors
/// Returns [`NodePathError`] if a path segment is `.` or `..`.
pub fn normalize_storage_path(path: &str) -> Result<String, NodePathError> {
    let path = path.replace('\\', "/");
    let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();
    if segments
        .iter()
        .any(|segment| *segment == "." || *segment == "..")
    {
        return Err(NodePathError(path));
    }
    Ok(segments.join("/"))
}

/// The store prefix of a normalised path, empty for the root and otherwise the path followed by `/`.
#[must_use]
pub fn path_to_prefix(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("{path}/")
    }
}

impl NodePath {
    /// Create a node path from `path`, normalising it.
    ///
    /// # Errors
    /// Returns [`NodePathError`] if `path` cannot be normalised.
    pub fn new(path: &str) -> Result<Self, NodePathError> {
        normalize_storage_path(path).map(Self)
    }

    /// The root node.
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// The normalised path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the root node.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The absolute name of the node, e.g. `/foo/bar`. The root is `/`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("/{}", self.0)
    }

    /// The final segment of the path, empty for the root.
    #[must_use]
    pub fn basename(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// The path of a child node.
    ///
    /// # Errors
    /// Returns [`NodePathError`] if `child` cannot be normalised.
    pub fn join(&self, child: &str) -> Result<Self, NodePathError> {
        Self::new(&format!("{}/{child}", self.0))
    }

    /// The paths of the ancestors of the node, from the root down to the parent.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        if self.is_root() {
            return Vec::new();
        }
        let mut ancestors = vec![Self::root()];
        ancestors.extend(
            self.0
                .match_indices('/')
                .map(|(i, _)| Self(self.0[..i].to_string())),
        );
        ancestors
    }

    /// The store prefix of the node.
    #[must_use]
    pub fn to_prefix(&self) -> StorePrefix {
        StorePrefix::new(path_to_prefix(&self.0)).unwrap_or_else(|_| StorePrefix::root())
    }

    fn key(&self, name: &str) -> Result<StoreKey, StorageError> {
        Ok(StoreKey::new(path_to_prefix(&self.0) + name)?)
    }
}

impl TryFrom<&str> for NodePath {
    type Error = NodePathError;

    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

/// The key of the array metadata of the node at `path`.
///
/// # Errors
/// Returns a [`StorageError`] if the key is invalid.
pub fn meta_key_array(path: &NodePath) -> Result<StoreKey, StorageError> {
    path.key(ARRAY_META_KEY)
}

/// The key of the group metadata of the node at `path`.
///
/// # Errors
/// Returns a [`StorageError`] if the key is invalid.
pub fn meta_key_group(path: &NodePath) -> Result<StoreKey, StorageError> {
    path.key(GROUP_META_KEY)
}

/// The key of the user attributes of the node at `path`.
///
/// # Errors
/// Returns a [`StorageError`] if the key is invalid.
pub fn meta_key_attributes(path: &NodePath) -> Result<StoreKey, StorageError> {
    path.key(ATTRS_META_KEY)
}

/// Returns true if an array exists at `path`.
///
/// # Errors
/// Returns a [`StorageError`] if the store fails.
pub fn contains_array<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<bool, StorageError> {
    storage.contains_key(&meta_key_array(path)?)
}

/// Returns true if a group exists at `path`.
///
/// # Errors
/// Returns a [`StorageError`] if the store fails.
pub fn contains_group<TStorage: ?Sized + ReadableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<bool, StorageError> {
    storage.contains_key(&meta_key_group(path)?)
}
