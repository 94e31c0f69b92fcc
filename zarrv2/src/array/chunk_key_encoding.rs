use zarrv2_metadata::ChunkKeySeparator;
use zarrv2_storage::{StoreKey, StoreKeyError};

use crate::node::{path_to_prefix, NodePath};

/// The store key of the chunk at `chunk_coords` of the array at `path`.
///
/// Chunk coordinates are joined with `separator`, e.g. `path/1.2`.
/// The single chunk of a zero dimensional array has the key `0`.
///
/// # Errors
/// Returns a [`StoreKeyError`] if the key is invalid.
pub fn chunk_key(
    path: &NodePath,
    chunk_coords: &[u64],
    separator: ChunkKeySeparator,
) -> Result<StoreKey, StoreKeyError> {
    let mut key = path_to_prefix(path.as_str());
    if chunk_coords.is_empty() {
        key.push('0');
    } else {
        let mut buffer = itoa::Buffer::new();
        for (i, coord) in chunk_coords.iter().enumerate() {
            if i > 0 {
                key.push(separator.as_char());
            }
            key.push_str(buffer.format(*coord));
        }
    }
    StoreKey::new(key)
}

/// Returns true if `name`, a key relative to an array prefix, could be a chunk key.
pub(crate) fn is_chunk_key_name(name: &str) -> bool {
    !name.is_empty()
        && name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_key_dot() {
        let path = NodePath::new("/foo/bar").unwrap();
        assert_eq!(
            chunk_key(&path, &[1, 23, 45], ChunkKeySeparator::Dot)
                .unwrap()
                .as_str(),
            "foo/bar/1.23.45"
        );
        assert_eq!(
            chunk_key(&NodePath::root(), &[0, 1], ChunkKeySeparator::Dot)
                .unwrap()
                .as_str(),
            "0.1"
        );
        assert_eq!(
            chunk_key(&NodePath::root(), &[], ChunkKeySeparator::Dot)
                .unwrap()
                .as_str(),
            "0"
        );
    }

    #[test]
    fn chunk_key_slash() {
        let path = NodePath::new("a").unwrap();
        assert_eq!(
            chunk_key(&path, &[3, 0], ChunkKeySeparator::Slash)
                .unwrap()
                .as_str(),
            "a/3/0"
        );
        assert!(is_chunk_key_name("3/0"));
        assert!(is_chunk_key_name("0.1"));
        assert!(!is_chunk_key_name(".zarray"));
        assert!(!is_chunk_key_name("sub/0.0"));
    }
}
