use std::sync::Arc;

use zarrv2_metadata::{ChunkShape, MetadataV2};
use zarrv2_storage::{ReadableStorageTraits, StorageError, WritableStorageTraits};

use super::{
    Array, ArrayCreateError, ArrayMetadataV2, ArrayOpenOptions, ArrayShape, ArrayState,
    ChunkKeySeparator, DataType, Endianness, FillValueMetadataV2,
};
use crate::node::{contains_array, contains_group, meta_key_array, meta_key_group, NodePath};

/// An [`Array`] builder.
///
/// [`ArrayBuilder`] is initialised from an array shape and data type.
///  - The chunk shape defaults to the array shape, i.e. a single chunk.
///  - Multi-byte data types are stored little endian.
///  - The fill value is zero.
///  - Chunks are not compressed, and chunk keys use the `.` separator.
///
/// [`build`](ArrayBuilder::build) does not modify the store, array metadata has to be explicitly written with [`Array::store_metadata`].
/// [`create`](ArrayBuilder::create) initialises the array in the store with [`init_array`] and then opens it.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # use std::sync::Arc;
/// use zarrv2::array::{ArrayBuilder, DataType};
/// # let store = Arc::new(zarrv2::storage::store::MemoryStore::new());
/// let array = ArrayBuilder::new(vec![8, 8], DataType::Float32)
///     .chunk_shape(vec![4, 4])
///     .fill_value(f64::NAN)
///     .create(store.clone(), "/group/array")?;
/// assert_eq!(array.nchunks(), 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ArrayBuilder {
    shape: ArrayShape,
    data_type: DataType,
    chunk_shape: Option<ArrayShape>,
    endianness: Endianness,
    fill_value: FillValueMetadataV2,
    compressor: Option<MetadataV2>,
    dimension_separator: ChunkKeySeparator,
    overwrite: bool,
    pub(crate) read_only: bool,
    cache_metadata: bool,
    cache_attrs: bool,
}

impl ArrayBuilder {
    /// Create a new array builder for an array of `shape` and `data_type`.
    #[must_use]
    pub fn new(shape: ArrayShape, data_type: DataType) -> Self {
        Self {
            shape,
            data_type,
            chunk_shape: None,
            endianness: Endianness::Little,
            fill_value: FillValueMetadataV2::from(0i64),
            compressor: None,
            dimension_separator: ChunkKeySeparator::Dot,
            overwrite: false,
            read_only: false,
            cache_metadata: true,
            cache_attrs: true,
        }
    }

    /// Set the shape.
    pub fn shape(&mut self, shape: ArrayShape) -> &mut Self {
        self.shape = shape;
        self
    }

    /// Set the data type.
    pub fn data_type(&mut self, data_type: DataType) -> &mut Self {
        self.data_type = data_type;
        self
    }

    /// Set the chunk shape.
    pub fn chunk_shape(&mut self, chunk_shape: ArrayShape) -> &mut Self {
        self.chunk_shape = Some(chunk_shape);
        self
    }

    /// Set the byte order of stored elements.
    pub fn endianness(&mut self, endianness: Endianness) -> &mut Self {
        self.endianness = endianness;
        self
    }

    /// Set the fill value.
    ///
    /// Use [`FillValueMetadataV2::Null`] for no fill value.
    pub fn fill_value(&mut self, fill_value: impl Into<FillValueMetadataV2>) -> &mut Self {
        self.fill_value = fill_value.into();
        self
    }

    /// Set the compressor, e.g. `{"id": "gzip", "level": 5}`.
    pub fn compressor(&mut self, compressor: Option<MetadataV2>) -> &mut Self {
        self.compressor = compressor;
        self
    }

    /// Set the chunk key dimension separator.
    pub fn dimension_separator(&mut self, dimension_separator: ChunkKeySeparator) -> &mut Self {
        self.dimension_separator = dimension_separator;
        self
    }

    /// If true, [`create`](ArrayBuilder::create) erases any existing node at the path.
    pub fn overwrite(&mut self, overwrite: bool) -> &mut Self {
        self.overwrite = overwrite;
        self
    }

    /// Set whether the array is read only.
    pub fn read_only(&mut self, read_only: bool) -> &mut Self {
        self.read_only = read_only;
        self
    }

    /// Set whether metadata is cached, see [`ArrayOpenOptions::cache_metadata`].
    pub fn cache_metadata(&mut self, cache_metadata: bool) -> &mut Self {
        self.cache_metadata = cache_metadata;
        self
    }

    /// Set whether attributes are cached, see [`ArrayOpenOptions::cache_attrs`].
    pub fn cache_attrs(&mut self, cache_attrs: bool) -> &mut Self {
        self.cache_attrs = cache_attrs;
        self
    }

    /// Build the array metadata.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if the configuration is invalid or unsupported.
    pub fn build_metadata(&self) -> Result<ArrayMetadataV2, ArrayCreateError> {
        let chunks = self.chunk_shape.clone().unwrap_or_else(|| {
            self.shape.iter().map(|length| (*length).max(1)).collect()
        });
        let metadata = ArrayMetadataV2::new(
            self.shape.clone(),
            ChunkShape::try_from(chunks)?,
            self.data_type.to_metadata(self.endianness),
            self.fill_value.clone(),
            self.compressor.clone(),
        )
        .with_dimension_separator(self.dimension_separator);
        ArrayState::new(metadata.clone())?;
        Ok(metadata)
    }

    fn open_options<TStorage: ?Sized>(
        &self,
        chunk_store: Option<Arc<TStorage>>,
    ) -> ArrayOpenOptions<TStorage> {
        ArrayOpenOptions {
            chunk_store,
            read_only: self.read_only,
            cache_metadata: self.cache_metadata,
            cache_attrs: self.cache_attrs,
        }
    }

    /// Build into an [`Array`] without writing to the store.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if the configuration is invalid or the path is invalid.
    pub fn build<TStorage: ?Sized>(
        &self,
        storage: Arc<TStorage>,
        path: &str,
    ) -> Result<Array<TStorage>, ArrayCreateError> {
        Array::new_with_metadata(storage, path, self.build_metadata()?, self.open_options(None))
    }

    /// Build into an [`Array`] storing chunks in `chunk_store`, without writing to either store.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if the configuration is invalid or the path is invalid.
    pub fn build_with_chunk_store<TStorage: ?Sized>(
        &self,
        storage: Arc<TStorage>,
        chunk_store: Arc<TStorage>,
        path: &str,
    ) -> Result<Array<TStorage>, ArrayCreateError> {
        Array::new_with_metadata(
            storage,
            path,
            self.build_metadata()?,
            self.open_options(Some(chunk_store)),
        )
    }

    /// Initialise the array in `storage` at `path` and open it.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError`] if
    ///  - the configuration or path is invalid,
    ///  - a node already exists at the path and `overwrite` is false,
    ///  - an ancestor of the path is an array, or
    ///  - there is a storage error.
    pub fn create<TStorage: ?Sized + ReadableStorageTraits + WritableStorageTraits>(
        &self,
        storage: Arc<TStorage>,
        path: &str,
    ) -> Result<Array<TStorage>, ArrayCreateError> {
        let node_path = NodePath::new(path)?;
        let metadata = self.build_metadata()?;
        init_array(&*storage, &node_path, &metadata, self.overwrite)?;
        Array::new_with_metadata(storage, path, metadata, self.open_options(None))
    }

    /// Initialise the array in `storage` at `path` with chunks stored in `chunk_store`, and open it.
    ///
    /// With `overwrite`, existing chunks under the path of `chunk_store` are erased too.
    ///
    /// # Errors
    /// See [`create`](ArrayBuilder::create).
    pub fn create_with_chunk_store<
        TStorage: ?Sized + ReadableStorageTraits + WritableStorageTraits,
    >(
        &self,
        storage: Arc<TStorage>,
        chunk_store: Arc<TStorage>,
        path: &str,
    ) -> Result<Array<TStorage>, ArrayCreateError> {
        let node_path = NodePath::new(path)?;
        let metadata = self.build_metadata()?;
        init_array(&*storage, &node_path, &metadata, self.overwrite)?;
        if self.overwrite {
            chunk_store.erase_prefix(&node_path.to_prefix())?;
        }
        Array::new_with_metadata(
            storage,
            path,
            metadata,
            self.open_options(Some(chunk_store)),
        )
    }
}

/// Write the array `metadata` to `storage` at `path`.
///
/// Missing ancestor groups are created.
/// With `overwrite`, every key under the path is erased first, otherwise an existing array or group at the path is an error.
///
/// # Errors
/// Returns [`ArrayCreateError::ContainsArray`] or [`ArrayCreateError::ContainsGroup`] if a node exists at the path and `overwrite` is false,
/// [`ArrayCreateError::ContainsArray`] if an ancestor is an array,
/// or [`ArrayCreateError::StorageError`] on a store error.
pub fn init_array<TStorage: ?Sized + ReadableStorageTraits + WritableStorageTraits>(
    storage: &TStorage,
    path: &NodePath,
    metadata: &ArrayMetadataV2,
    overwrite: bool,
) -> Result<(), ArrayCreateError> {
    if overwrite {
        storage.erase_prefix(&path.to_prefix())?;
    } else if contains_array(storage, path)? {
        return Err(ArrayCreateError::ContainsArray(path.name()));
    } else if contains_group(storage, path)? {
        return Err(ArrayCreateError::ContainsGroup(path.name()));
    }
    require_parent_groups(storage, path).map_err(|err| match err {
        RequireGroupError::ContainsArray(path) => ArrayCreateError::ContainsArray(path),
        RequireGroupError::StorageError(err) => ArrayCreateError::StorageError(err),
    })?;

    let key = meta_key_array(path)?;
    let metadata = serde_json::to_vec_pretty(metadata)
        .map_err(|err| StorageError::InvalidMetadata(key.clone(), err.to_string()))?;
    storage.set(&key, metadata.into())?;
    Ok(())
}

pub(crate) enum RequireGroupError {
    ContainsArray(String),
    StorageError(StorageError),
}

impl From<StorageError> for RequireGroupError {
    fn from(err: StorageError) -> Self {
        Self::StorageError(err)
    }
}

/// Create any missing group among the ancestors of `path`.
pub(crate) fn require_parent_groups<
    TStorage: ?Sized + ReadableStorageTraits + WritableStorageTraits,
>(
    storage: &TStorage,
    path: &NodePath,
) -> Result<(), RequireGroupError> {
    for ancestor in path.ancestors() {
        if contains_array(storage, &ancestor)? {
            return Err(RequireGroupError::ContainsArray(ancestor.name()));
        }
        if !contains_group(storage, &ancestor)? {
            log::debug!("creating implicit group {}", ancestor.name());
            storage.set(&meta_key_group(&ancestor)?, group_metadata_bytes()?)?;
        }
    }
    Ok(())
}

pub(crate) fn group_metadata_bytes() -> Result<bytes::Bytes, StorageError> {
    serde_json::to_vec_pretty(&zarrv2_metadata::GroupMetadataV2::new())
        .map(Into::into)
        .map_err(|err| StorageError::Other(err.to_string()))
}
