//! Zarr V2 groups.
//!
//! A group is a node of a Zarr hierarchy with `.zgroup` metadata, optional `.zattrs` attributes, and child arrays and groups.
//!
//! Use [`Group::create`] to initialise a group and [`Group::open`] to open an existing group.

use std::sync::Arc;

use thiserror::Error;
use zarrv2_metadata::GroupMetadataV2;
use zarrv2_storage::{
    discover_children, ListableStorageTraits, ReadableStorageTraits, StorageError,
    WritableStorageTraits,
};

use crate::{
    array::{
        group_metadata_bytes, require_parent_groups, Array, ArrayBuilder, ArrayCreateError,
        ArrayOpenOptions, RequireGroupError,
    },
    attributes::Attributes,
    node::{
        contains_array, contains_group, meta_key_attributes, meta_key_group, NodePath,
        NodePathError,
    },
};

/// A group creation error.
#[derive(Clone, Debug, Error)]
pub enum GroupCreateError {
    /// An invalid node path.
    #[error(transparent)]
    NodePathError(#[from] NodePathError),
    /// An array exists at the path.
    #[error("an array already exists at path {_0}")]
    ContainsArray(String),
    /// A group exists at the path.
    #[error("a group already exists at path {_0}")]
    ContainsGroup(String),
    /// There is no group at the path.
    #[error("group not found at path {_0}")]
    MissingMetadata(String),
    /// The group is read only.
    #[error("group is read only")]
    ReadOnly,
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
}

impl From<RequireGroupError> for GroupCreateError {
    fn from(err: RequireGroupError) -> Self {
        match err {
            RequireGroupError::ContainsArray(path) => Self::ContainsArray(path),
            RequireGroupError::StorageError(err) => Self::StorageError(err),
        }
    }
}

/// Options for opening a group.
#[derive(Copy, Clone, Debug)]
pub struct GroupOpenOptions {
    /// Reject writes to the group, its attributes, and its children.
    pub read_only: bool,
    /// Hold attributes after the first read.
    pub cache_attrs: bool,
}

impl Default for GroupOpenOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            cache_attrs: true,
        }
    }
}

/// A group.
#[derive(Debug)]
pub struct Group<TStorage: ?Sized> {
    storage: Arc<TStorage>,
    path: NodePath,
    options: GroupOpenOptions,
    metadata: GroupMetadataV2,
    attributes: Attributes<TStorage>,
}

impl<TStorage: ?Sized> Group<TStorage> {
    /// Create a group in `storage` at `path` with `metadata`.
    /// This does not write to the store.
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if the path is invalid.
    pub fn new_with_metadata(
        storage: Arc<TStorage>,
        path: &str,
        metadata: GroupMetadataV2,
        options: GroupOpenOptions,
    ) -> Result<Self, GroupCreateError> {
        let path = NodePath::new(path)?;
        let attributes = Attributes::new(
            storage.clone(),
            meta_key_attributes(&path)?,
            options.read_only,
            options.cache_attrs,
        );
        Ok(Self {
            storage,
            path,
            options,
            metadata,
            attributes,
        })
    }

    /// The node path.
    #[must_use]
    pub const fn path(&self) -> &NodePath {
        &self.path
    }

    /// The absolute name of the group, e.g. `/foo`.
    #[must_use]
    pub fn name(&self) -> String {
        self.path.name()
    }

    /// The final component of the group name.
    #[must_use]
    pub fn basename(&self) -> &str {
        self.path.basename()
    }

    /// The group metadata.
    #[must_use]
    pub const fn metadata(&self) -> &GroupMetadataV2 {
        &self.metadata
    }

    /// The user attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes<TStorage> {
        &self.attributes
    }

    /// Returns true if the group is read only.
    #[must_use]
    pub const fn read_only(&self) -> bool {
        self.options.read_only
    }

    fn child_path(&self, name: &str) -> Result<NodePath, NodePathError> {
        self.path.join(name)
    }

    fn child_array_options(&self) -> ArrayOpenOptions<TStorage> {
        ArrayOpenOptions {
            read_only: self.options.read_only,
            cache_attrs: self.options.cache_attrs,
            ..ArrayOpenOptions::default()
        }
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits + 'static> Group<TStorage> {
    /// Open an existing group in `storage` at `path`.
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if an array exists at the path, there is no group at the path, or there is a storage error.
    pub fn open(storage: Arc<TStorage>, path: &str) -> Result<Self, GroupCreateError> {
        Self::open_opt(storage, path, GroupOpenOptions::default())
    }

    /// Open an existing group with non-default [`GroupOpenOptions`].
    ///
    /// # Errors
    /// See [`open`](Group::open).
    pub fn open_opt(
        storage: Arc<TStorage>,
        path: &str,
        options: GroupOpenOptions,
    ) -> Result<Self, GroupCreateError> {
        let node_path = NodePath::new(path)?;
        if contains_array(&*storage, &node_path)? {
            return Err(GroupCreateError::ContainsArray(node_path.name()));
        }
        let key = meta_key_group(&node_path)?;
        let metadata = match storage.get(&key)? {
            Some(metadata) => serde_json::from_slice(&metadata)
                .map_err(|err| StorageError::InvalidMetadata(key, err.to_string()))?,
            None => return Err(GroupCreateError::MissingMetadata(node_path.name())),
        };
        Self::new_with_metadata(storage, path, metadata, options)
    }

    /// Open the child array `name`.
    ///
    /// The array inherits the read only and attribute caching options of the group.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if the array does not exist or cannot be opened.
    pub fn open_array(&self, name: &str) -> Result<Array<TStorage>, ArrayCreateError> {
        let path = self.child_path(name)?;
        Array::open_opt(
            self.storage.clone(),
            path.as_str(),
            self.child_array_options(),
        )
    }

    /// Open the child group `name`.
    ///
    /// # Errors
    /// See [`open`](Group::open).
    pub fn open_group(&self, name: &str) -> Result<Self, GroupCreateError> {
        let path = self.child_path(name)?;
        Self::open_opt(self.storage.clone(), path.as_str(), self.options)
    }

    /// Returns true if the child `name` is an array.
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if `name` is invalid or there is a storage error.
    pub fn contains_array(&self, name: &str) -> Result<bool, GroupCreateError> {
        Ok(contains_array(&*self.storage, &self.child_path(name)?)?)
    }

    /// Returns true if the child `name` is a group.
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if `name` is invalid or there is a storage error.
    pub fn contains_group(&self, name: &str) -> Result<bool, GroupCreateError> {
        Ok(contains_group(&*self.storage, &self.child_path(name)?)?)
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits + ListableStorageTraits + 'static> Group<TStorage> {
    fn children(&self) -> Result<Vec<NodePath>, GroupCreateError> {
        discover_children(&self.storage, &self.path.to_prefix())?
            .iter()
            .map(|prefix| NodePath::new(prefix.as_str()).map_err(GroupCreateError::from))
            .collect()
    }

    /// The paths of the child arrays.
    ///
    /// # Errors
    /// Returns a [`GroupCreateError`] if the store cannot be listed.
    pub fn child_arrays(&self) -> Result<Vec<NodePath>, GroupCreateError> {
        let mut arrays = Vec::new();
        for child in self.children()? {
            if contains_array(&*self.storage, &child)? {
                arrays.push(child);
            }
        }
        Ok(arrays)
    }

    /// The paths of the child groups.
    ///
    /// # Errors
    /// Returns a [`GroupCreateError`] if the store cannot be listed.
    pub fn child_groups(&self) -> Result<Vec<NodePath>, GroupCreateError> {
        let mut groups = Vec::new();
        for child in self.children()? {
            if contains_group(&*self.storage, &child)? {
                groups.push(child);
            }
        }
        Ok(groups)
    }
}

impl<TStorage: ?Sized + ReadableStorageTraits + WritableStorageTraits + 'static> Group<TStorage> {
    /// Initialise a group in `storage` at `path` and open it.
    ///
    /// Missing ancestor groups are created.
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if
    ///  - an array exists at the path or at an ancestor,
    ///  - a group exists at the path and `overwrite` is false, or
    ///  - there is a storage error.
    pub fn create(
        storage: Arc<TStorage>,
        path: &str,
        overwrite: bool,
    ) -> Result<Self, GroupCreateError> {
        let node_path = NodePath::new(path)?;
        if overwrite {
            storage.erase_prefix(&node_path.to_prefix())?;
        } else if contains_array(&*storage, &node_path)? {
            return Err(GroupCreateError::ContainsArray(node_path.name()));
        } else if contains_group(&*storage, &node_path)? {
            return Err(GroupCreateError::ContainsGroup(node_path.name()));
        }
        require_parent_groups(&*storage, &node_path)?;
        storage.set(&meta_key_group(&node_path)?, group_metadata_bytes()?)?;
        Self::new_with_metadata(
            storage,
            path,
            GroupMetadataV2::new(),
            GroupOpenOptions::default(),
        )
    }

    /// Open the group at `path`, creating it if no node exists there.
    ///
    /// # Errors
    /// Returns [`GroupCreateError`] if an array exists at the path or there is a storage error.
    pub fn open_or_create(storage: Arc<TStorage>, path: &str) -> Result<Self, GroupCreateError> {
        let node_path = NodePath::new(path)?;
        if contains_group(&*storage, &node_path)? {
            Self::open(storage, path)
        } else {
            Self::create(storage, path, false)
        }
    }

    /// Create the child group `name`.
    ///
    /// # Errors
    /// Returns [`GroupCreateError::ReadOnly`] if this group is read only, otherwise see [`create`](Group::create).
    pub fn create_group(&self, name: &str, overwrite: bool) -> Result<Self, GroupCreateError> {
        if self.options.read_only {
            return Err(GroupCreateError::ReadOnly);
        }
        let path = self.child_path(name)?;
        Self::create(self.storage.clone(), path.as_str(), overwrite)
    }

    /// Create the child array `name` configured by `builder`.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError::ReadOnly`] if this group is read only, otherwise see [`ArrayBuilder::create`].
    pub fn create_array(
        &self,
        name: &str,
        builder: &ArrayBuilder,
    ) -> Result<Array<TStorage>, ArrayCreateError> {
        if self.options.read_only {
            return Err(ArrayCreateError::ReadOnly);
        }
        let path = self.child_path(name)?;
        builder.create(self.storage.clone(), path.as_str())
    }
}
