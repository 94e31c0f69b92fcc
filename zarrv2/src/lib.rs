//! `zarrv2` is a Rust library for chunked, compressed, N-dimensional arrays stored in the [Zarr V2](https://zarr-specs.readthedocs.io/en/latest/v2/v2.0.html) format.
//!
//! An array is split into a regular grid of chunks.
//! Each chunk is encoded by an optional compressor and stored as a single value of a key-value store under a key derived from its grid coordinates.
//! Reads and writes address the array with NumPy-style selections: integers, ranges with a step (including negative steps), and an ellipsis.
//!
//! ## Getting Started
//! - Create a store, e.g. an in-memory [`MemoryStore`](crate::storage::store::MemoryStore), or implement the [`storage`] traits for your own.
//! - Create an array with an [`ArrayBuilder`](crate::array::ArrayBuilder) or [`creation`] functions, or open one with [`Array::open`](crate::array::Array::open).
//! - Read with [`Array::get`](crate::array::Array::get) or [`Array::get_raw`](crate::array::Array::get_raw), write with [`Array::set`](crate::array::Array::set).
//!
//! ## Example
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use zarrv2::array::{Array, ArrayBuilder, DataType};
//! use zarrv2::indexer::{ArraySelection, Selector, Slice};
//!
//! let store = Arc::new(zarrv2::storage::store::MemoryStore::new());
//!
//! // An 8x8 int32 array of 4x4 chunks compressed with gzip
//! let array = ArrayBuilder::new(vec![8, 8], DataType::Int32)
//!     .chunk_shape(vec![4, 4])
//!     .compressor(Some(serde_json::from_str(r#"{"id": "gzip", "level": 1}"#)?))
//!     .create(store.clone(), "/group/array")?;
//!
//! // Write a scalar to a region spanning four chunks
//! array.set([Selector::from(Slice::range(2, 6)?), Slice::range(2, 6)?.into()], 42i32)?;
//!
//! // Read every other element of row 3
//! let row = Array::open(store, "group/array")?
//!     .get::<i32>([Selector::Index(3), Slice::new(None, None, Some(2))?.into()])?
//!     .array()
//!     .ok_or("expected an array")?;
//! assert_eq!(row.flatten(), vec![0, 42, 42, 0]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//! `zarrv2` logs information and warnings using the [`log`] crate.
//! A logging implementation must be enabled to capture logs.
//!
//! ## Crate Features
//! #### Default
//!  - Codecs: `gzip`, `zlib`.
//!
//! #### Non-Default
//!  - `async`: an asynchronous API for [`stores`](storage) and [`Array`](crate::array::Array).
//!    Chunks are retrieved and stored concurrently, limited by [`ArrayOptions::concurrent_target`](crate::array::ArrayOptions::concurrent_target).
//!
//! ## Licence
//! `zarrv2` is licensed under either of
//!  - the Apache License, Version 2.0 or <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license or <http://opensource.org/licenses/MIT>, at your option.
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod array;
pub mod attributes;
pub mod config;
pub mod creation;
pub mod group;
pub mod indexer;
pub mod node;

pub use zarrv2_metadata as metadata;
pub use zarrv2_storage as storage;
