#![allow(missing_docs)]

use std::sync::{Arc, Mutex};

use zarrv2::array::{
    Array, ArrayBuilder, ArrayError, ArrayOpenOptions, ArrayOptions, ArrayValue, DataType,
    Endianness, FillValueMetadataV2, NestedArray, ProgressUpdate, RawArray,
};
use zarrv2::indexer::{ArraySelection, IndexingError, Selector, Slice};
use zarrv2::storage::storage_adapter::performance_metrics::PerformanceMetricsStorageAdapter;
use zarrv2::storage::store::MemoryStore;
use zarrv2::storage::{ReadableStorageTraits, StoreKey};

fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Selector {
    Selector::Range(Slice::new(start, stop, step).unwrap())
}

fn arange_array(store: Arc<MemoryStore>) -> Result<Array<MemoryStore>, Box<dyn std::error::Error>> {
    let array = ArrayBuilder::new(vec![8, 8], DataType::Int32)
        .chunk_shape(vec![4, 4])
        .create(store, "arange")?;
    array.set(
        ArraySelection::all(),
        NestedArray::from_flat((0..64).collect(), vec![8, 8])?,
    )?;
    Ok(array)
}

#[test]
fn array_sync_get() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = arange_array(store.clone())?;
    assert_eq!(array.nchunks(), 4);
    assert_eq!(array.nchunks_initialized()?, 4);
    assert!(array.is_initialized()?);

    let all = array.get::<i32>(ArraySelection::all())?.array().unwrap();
    assert_eq!(all.flatten(), (0..64).collect::<Vec<i32>>());

    let row = array.get::<i32>([Selector::Index(1), Selector::Full])?.array().unwrap();
    assert_eq!(row.shape(), &[8]);
    assert_eq!(row.flatten(), (8..16).collect::<Vec<i32>>());

    let column = array
        .get::<i32>([slice(Some(1), Some(7), Some(2)), Selector::Index(-1)])?
        .array()
        .unwrap();
    assert_eq!(column.flatten(), vec![15, 31, 47]);

    let reversed = array
        .get::<i32>([slice(None, None, Some(-3)), Selector::Index(0)])?
        .array()
        .unwrap();
    assert_eq!(reversed.flatten(), vec![56, 32, 8]);

    let ellipsis = array
        .get::<i32>([Selector::Ellipsis, Selector::Index(2)])?
        .array()
        .unwrap();
    assert_eq!(ellipsis.flatten(), vec![2, 10, 18, 26, 34, 42, 50, 58]);

    assert_eq!(
        array.get::<i32>([Selector::Index(3), Selector::Index(4)])?.scalar(),
        Some(28)
    );
    assert_eq!(
        array.get_raw::<i32>([Selector::Index(-1), Selector::Index(-1)])?.scalar(),
        Some(63)
    );

    let raw = array
        .get_raw::<i32>([slice(Some(2), Some(6), None), slice(Some(3), Some(5), None)])?
        .array()
        .unwrap();
    assert_eq!(raw.shape(), &[4, 2]);
    assert_eq!(raw.data(), &[19, 20, 27, 28, 35, 36, 43, 44]);

    let chunk = array.get_raw_chunk::<i32>(&[1, 0])?;
    assert_eq!(chunk.shape(), &[4, 4]);
    assert_eq!(&chunk.data()[..4], &[32, 33, 34, 35]);
    assert!(matches!(
        array.get_raw_chunk::<i32>(&[2, 0]),
        Err(ArrayError::InvalidChunkGridIndicesError(_))
    ));
    Ok(())
}

#[test]
fn array_sync_get_1d_strided() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = ArrayBuilder::new(vec![1050], DataType::Int32)
        .chunk_shape(vec![100])
        .create(store, "array")?;
    array.set(
        ArraySelection::all(),
        RawArray::new((0..1050).collect(), vec![1050])?,
    )?;

    let strided = array
        .get::<i32>(slice(Some(81), Some(121), Some(3)))?
        .array()
        .unwrap();
    assert_eq!(strided.flatten(), (81..121).step_by(3).collect::<Vec<i32>>());

    let reversed = array
        .get_raw::<i32>(slice(None, None, Some(-1)))?
        .array()
        .unwrap();
    assert_eq!(reversed.into_data(), (0..1050).rev().collect::<Vec<i32>>());

    let tail = array
        .get::<i32>(slice(Some(-5), None, None))?
        .array()
        .unwrap();
    assert_eq!(tail.flatten(), vec![1045, 1046, 1047, 1048, 1049]);

    let empty = array
        .get::<i32>(slice(Some(10), Some(10), None))?
        .array()
        .unwrap();
    assert_eq!(empty.shape(), &[0]);
    Ok(())
}

#[test]
fn array_sync_sparse_writes() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = ArrayBuilder::new(vec![8, 8], DataType::Int32)
        .chunk_shape(vec![4, 4])
        .fill_value(0i64)
        .create(store, "sparse")?;
    assert_eq!(array.metadata().dtype, "<i4");

    array.set([Selector::Index(0), Selector::Index(0)], 1i32)?;
    array.set([Selector::Index(0), Selector::Index(1)], 2i32)?;
    array.set([Selector::Index(7), Selector::Index(7)], 3i32)?;
    assert_eq!(array.nchunks_initialized()?, 2);

    assert_eq!(
        array.get::<i32>([Selector::Index(4), Selector::Index(4)])?.scalar(),
        Some(0)
    );
    assert_eq!(
        array
            .get::<i32>([Selector::Index(0), slice(None, Some(5), None)])?
            .array()
            .unwrap()
            .flatten(),
        vec![1, 2, 0, 0, 0]
    );
    assert_eq!(
        array.get::<i32>([Selector::Index(7), Selector::Index(7)])?.scalar(),
        Some(3)
    );
    Ok(())
}

#[test]
fn array_sync_set_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = ArrayBuilder::new(vec![6, 5], DataType::UInt16)
        .chunk_shape(vec![4, 4])
        .endianness(Endianness::Big)
        .create(store.clone(), "array")?;
    let value = NestedArray::from_flat((0u16..30).collect(), vec![6, 5])?;
    let chunk_keys = [[0, 0], [0, 1], [1, 0], [1, 1]]
        .iter()
        .map(|chunk_coords| array.chunk_key(chunk_coords))
        .collect::<Result<Vec<_>, _>>()?;

    array.set(ArraySelection::all(), value.clone())?;
    let first = chunk_keys
        .iter()
        .map(|key| store.get(key))
        .collect::<Result<Vec<_>, _>>()?;
    array.set(ArraySelection::all(), value)?;
    let second = chunk_keys
        .iter()
        .map(|key| store.get(key))
        .collect::<Result<Vec<_>, _>>()?;

    assert!(first.iter().all(Option::is_some));
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn array_sync_set_matches_in_memory() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = ArrayBuilder::new(vec![7, 9], DataType::Float64)
        .chunk_shape(vec![3, 4])
        .create(store, "array")?;
    let mut memory = NestedArray::<f64>::zeros(vec![7, 9]);

    let updates: Vec<(ArraySelection, ArrayValue<f64>)> = vec![
        (
            [slice(Some(1), Some(6), Some(2)), slice(None, None, Some(-1))].into(),
            NestedArray::from_flat((0..27).map(f64::from).collect(), vec![3, 9])?.into(),
        ),
        ([Selector::Index(-1), Selector::Ellipsis].into(), 3.5.into()),
        (
            [slice(None, None, Some(-2)), Selector::Index(4)].into(),
            RawArray::new(vec![-1.0, -2.0, -3.0, -4.0], vec![4])?.into(),
        ),
        (
            [Selector::Ellipsis, slice(Some(2), Some(-2), Some(3))].into(),
            NestedArray::from_flat((100..114).map(f64::from).collect(), vec![7, 2])?.into(),
        ),
        ([Selector::Index(0), Selector::Index(0)].into(), (-7.25).into()),
    ];

    for (selection, value) in updates {
        memory.set(selection.clone(), value.clone())?;
        array.set(selection, value)?;
        assert_eq!(
            array.get::<f64>(ArraySelection::all())?.array(),
            Some(memory.clone())
        );
        assert_eq!(
            array.get_raw::<f64>(ArraySelection::all())?.array().unwrap().into_data(),
            memory.flatten()
        );
    }
    Ok(())
}

#[test]
fn array_sync_set_total_chunks_skip_reads() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(PerformanceMetricsStorageAdapter::new(Arc::new(
        MemoryStore::new(),
    )));
    let array = ArrayBuilder::new(vec![8, 8], DataType::UInt8)
        .chunk_shape(vec![4, 4])
        .create(store.clone(), "array")?;

    store.reset();
    array.set(ArraySelection::all(), 5u8)?;
    assert_eq!(store.reads(), 0);
    assert_eq!(store.writes(), 4);

    store.reset();
    let value = NestedArray::from_flat((0..16).collect(), vec![4, 4])?;
    array.set(
        [slice(Some(4), Some(8), None), slice(Some(0), Some(4), None)],
        value,
    )?;
    assert_eq!(store.reads(), 0);
    assert_eq!(store.writes(), 1);

    store.reset();
    array.set([Selector::Index(0), slice(Some(1), Some(3), None)], 9u8)?;
    assert_eq!(store.reads(), 1);
    assert_eq!(store.writes(), 1);

    let all = array.get_raw::<u8>(ArraySelection::all())?.array().unwrap();
    assert_eq!(&all.data()[..4], &[5, 9, 9, 5]);
    assert_eq!(&all.data()[32..36], &[0, 1, 2, 3]);
    Ok(())
}

#[test]
fn array_sync_progress() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = ArrayBuilder::new(vec![10], DataType::Int16)
        .chunk_shape(vec![3])
        .create(store, "array")?;

    let updates = Arc::new(Mutex::new(Vec::new()));
    let options = ArrayOptions::default().with_progress_callback({
        let updates = updates.clone();
        move |update| updates.lock().unwrap().push(update)
    });
    let expected: Vec<ProgressUpdate> = (0..=4)
        .map(|progress| ProgressUpdate {
            progress,
            queue_size: 4,
        })
        .collect();

    array.set_opt(ArraySelection::all(), 1i16, &options)?;
    assert_eq!(*updates.lock().unwrap(), expected);

    updates.lock().unwrap().clear();
    array.get_opt::<i16>(ArraySelection::all(), &options)?;
    assert_eq!(*updates.lock().unwrap(), expected);

    updates.lock().unwrap().clear();
    array.get_raw_opt::<i16>(slice(Some(2), Some(4), None), &options)?;
    assert_eq!(
        *updates.lock().unwrap(),
        vec![
            ProgressUpdate { progress: 0, queue_size: 2 },
            ProgressUpdate { progress: 1, queue_size: 2 },
            ProgressUpdate { progress: 2, queue_size: 2 },
        ]
    );
    Ok(())
}

#[test]
fn array_sync_big_endian() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = ArrayBuilder::new(vec![4], DataType::UInt16)
        .endianness(Endianness::Big)
        .create(store.clone(), "array")?;
    assert_eq!(array.metadata().dtype, ">u2");
    assert_eq!(array.endianness(), Some(Endianness::Big));

    array.set(
        ArraySelection::all(),
        NestedArray::from_flat(vec![1u16, 2, 3, 258], vec![4])?,
    )?;
    let encoded = store.get(&StoreKey::new("array/0")?)?.unwrap();
    assert_eq!(encoded.as_ref(), &[0, 1, 0, 2, 0, 3, 1, 2]);

    let array = Array::<MemoryStore>::open(store, "array")?;
    assert_eq!(
        array.get::<u16>(ArraySelection::all())?.array().unwrap().flatten(),
        vec![1, 2, 3, 258]
    );
    Ok(())
}

#[cfg(feature = "gzip")]
#[test]
fn array_sync_gzip() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = ArrayBuilder::new(vec![20, 20], DataType::Float32)
        .chunk_shape(vec![10, 10])
        .compressor(Some(serde_json::from_str(r#"{"id": "gzip", "level": 5}"#)?))
        .create(store.clone(), "array")?;
    let data: Vec<f32> = (0..400u16).map(f32::from).collect();
    array.set(ArraySelection::all(), RawArray::new(data.clone(), vec![20, 20])?)?;

    let encoded = store.get(&StoreKey::new("array/1.1")?)?.unwrap();
    assert_eq!(&encoded[..2], &[0x1f, 0x8b]);

    let array = Array::<MemoryStore>::open(store, "array")?;
    assert_eq!(array.compressor().map(|codec| codec.id()), Some("gzip"));
    assert_eq!(
        array.get_raw::<f32>(ArraySelection::all())?.array().unwrap().into_data(),
        data
    );
    Ok(())
}

#[test]
fn array_sync_fill_value() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let mut builder = ArrayBuilder::new(vec![6], DataType::Int64);
    builder.chunk_shape(vec![2]);

    let array = zarrv2::creation::full(store.clone(), "full", 7i64, &builder)?;
    array.set(
        slice(Some(2), Some(4), None),
        NestedArray::from_flat(vec![1i64, 2], vec![2])?,
    )?;
    assert_eq!(array.nchunks_initialized()?, 1);
    assert!(!array.is_initialized()?);
    assert_eq!(
        array.get::<i64>(ArraySelection::all())?.array().unwrap().flatten(),
        vec![7, 7, 1, 2, 7, 7]
    );
    assert_eq!(array.get_raw_chunk::<i64>(&[2])?.data(), &[7, 7]);
    assert_eq!(array.retrieve_chunk_elements_if_exists::<i64>(&[2])?, None);

    // A partial write to a missing chunk starts from the fill value
    array.set(Selector::Index(5), -1i64)?;
    assert_eq!(array.retrieve_chunk_elements_if_exists::<i64>(&[2])?, Some(vec![7, -1]));

    let array = zarrv2::creation::empty(store, "empty", &builder)?;
    assert_eq!(array.metadata().fill_value, FillValueMetadataV2::Null);
    assert_eq!(
        array.get::<i64>(ArraySelection::all())?.array().unwrap().flatten(),
        vec![0; 6]
    );
    Ok(())
}

#[test]
fn array_sync_errors() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = arange_array(store.clone())?;

    assert!(matches!(
        array.get::<f32>(ArraySelection::all()),
        Err(ArrayError::IncompatibleElementType {
            expected: DataType::Int32,
            got: DataType::Float32
        })
    ));
    assert!(matches!(
        array.get::<i32>([Selector::Index(8)]),
        Err(ArrayError::IndexingError(IndexingError::BoundsCheck { index: 8, length: 8 }))
    ));
    assert!(matches!(
        array.get::<i32>([Selector::Index(0), Selector::Index(0), Selector::Index(0)]),
        Err(ArrayError::IndexingError(IndexingError::TooManyIndices { expected: 2, got: 3 }))
    ));
    assert!(matches!(
        array.get::<i32>([Selector::Ellipsis, Selector::Ellipsis]),
        Err(ArrayError::IndexingError(IndexingError::MultipleEllipsis))
    ));
    assert!(matches!(
        array.set(
            slice(Some(0), Some(4), None),
            NestedArray::from_flat(vec![0i32; 24], vec![3, 8])?
        ),
        Err(ArrayError::InvalidDataShape { .. })
    ));

    let options = ArrayOpenOptions {
        read_only: true,
        ..ArrayOpenOptions::default()
    };
    let read_only = Array::open_opt(store.clone(), "arange", options)?;
    assert!(matches!(
        read_only.set(ArraySelection::all(), 0i32),
        Err(ArrayError::ReadOnly)
    ));
    assert!(read_only.attributes().set_item("a", 1.into()).is_err());
    assert_eq!(read_only.get::<i32>([Selector::Index(0), Selector::Index(1)])?.scalar(), Some(1));

    assert!(matches!(
        Array::open(store, "missing"),
        Err(zarrv2::array::ArrayCreateError::MissingMetadata)
    ));
    Ok(())
}

#[test]
fn array_sync_reload_metadata() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let mut builder = ArrayBuilder::new(vec![4], DataType::UInt32);
    builder.fill_value(3i64);
    builder.create(store.clone(), "array")?;

    let options = ArrayOpenOptions {
        cache_metadata: false,
        ..ArrayOpenOptions::default()
    };
    let uncached = Array::open_opt(store.clone(), "array", options)?;
    let cached = Array::open(store.clone(), "array")?;

    builder.shape(vec![6]).fill_value(5i64).overwrite(true);
    builder.create(store, "array")?;

    assert_eq!(uncached.shape(), vec![4]);
    assert_eq!(
        uncached.get::<u32>(ArraySelection::all())?.array().unwrap().flatten(),
        vec![5; 6]
    );
    assert_eq!(uncached.shape(), vec![6]);
    assert_eq!(
        cached.get::<u32>(ArraySelection::all())?.array().unwrap().flatten(),
        vec![3; 4]
    );
    Ok(())
}

#[test]
fn array_sync_chunk_writes_reload_metadata() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let mut builder = ArrayBuilder::new(vec![4], DataType::UInt8);
    builder.chunk_shape(vec![2]);
    builder.create(store.clone(), "array")?;

    let options = ArrayOpenOptions {
        cache_metadata: false,
        ..ArrayOpenOptions::default()
    };
    let uncached = Array::open_opt(store.clone(), "array", options)?;
    let cached = Array::open(store.clone(), "array")?;

    builder.shape(vec![8]).overwrite(true);
    builder.create(store, "array")?;

    uncached.store_chunk_elements(&[3], &[7u8, 8])?;
    assert!(matches!(
        cached.store_chunk_elements(&[3], &[7u8, 8]),
        Err(ArrayError::InvalidChunkGridIndicesError(_))
    ));
    assert_eq!(
        uncached.get_raw::<u8>(ArraySelection::all())?.array().unwrap().into_data(),
        vec![0, 0, 0, 0, 0, 0, 7, 8]
    );
    uncached.erase_chunk(&[3])?;
    assert!(matches!(
        cached.erase_chunk(&[3]),
        Err(ArrayError::InvalidChunkGridIndicesError(_))
    ));
    assert_eq!(
        uncached.get_raw::<u8>(ArraySelection::all())?.array().unwrap().into_data(),
        vec![0; 8]
    );
    Ok(())
}

#[test]
fn array_sync_chunk_keys() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = ArrayBuilder::new(vec![4, 4], DataType::Int8)
        .chunk_shape(vec![2, 2])
        .dimension_separator(zarrv2::array::ChunkKeySeparator::Slash)
        .create(store.clone(), "a/b")?;
    assert_eq!(array.chunk_key(&[1, 0])?.as_str(), "a/b/1/0");
    array.set([Selector::Index(2), Selector::Index(1)], 1i8)?;
    assert!(store.get(&StoreKey::new("a/b/1/0")?)?.is_some());
    assert_eq!(array.nchunks_initialized()?, 1);

    let scalar = ArrayBuilder::new(vec![], DataType::Int32).create(store.clone(), "scalar")?;
    scalar.set(ArraySelection::all(), 42i32)?;
    assert!(store.get(&StoreKey::new("scalar/0")?)?.is_some());
    assert_eq!(scalar.get::<i32>(ArraySelection::all())?.scalar(), Some(42));
    Ok(())
}

#[test]
fn array_sync_attributes() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = arange_array(store.clone())?;
    array.attributes().set_item("units", "m".into())?;
    array.attributes().set_item("scale", 2.into())?;

    let array = Array::open(store, "arange")?;
    assert_eq!(array.attributes().get_item("units")?, Some("m".into()));
    assert_eq!(array.attributes().keys()?, vec!["units", "scale"]);
    array.attributes().delete_item("units")?;
    assert!(!array.attributes().contains_item("units")?);
    Ok(())
}

#[test]
fn array_sync_logs_fast_path() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = ArrayBuilder::new(vec![4], DataType::UInt8)
        .chunk_shape(vec![2])
        .create(store, "array")?;

    testing_logger::setup();
    array.set(slice(Some(0), Some(3), None), 1u8)?;
    testing_logger::validate(|captured_logs| {
        let bodies: Vec<&str> = captured_logs.iter().map(|log| log.body.as_str()).collect();
        assert!(bodies.contains(&"overwriting chunk array/0"));
        assert!(bodies.contains(&"updating chunk array/1"));
    });
    Ok(())
}
