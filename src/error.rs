use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading a map or encoding it to `.mdat`.
#[derive(Debug, Error)]
pub enum MapError {
    /// A property value has no wire encoding.
    #[error("property '{name}' has unsupported type '{kind}'")]
    UnsupportedPropertyType {
        /// Property key.
        name: String,
        /// Kind of the rejected value.
        kind: String,
    },

    /// Computed size and emitted byte count disagree.
    #[error("encoded size mismatch: computed {expected} bytes, emitted {actual}")]
    SizeMismatch {
        /// Size derived from the field list.
        expected: usize,
        /// Bytes actually written.
        actual: usize,
    },

    /// A string is too long for its 16-bit length prefix.
    #[error("string of {length} bytes exceeds the {max} byte limit of a length prefix")]
    StringTooLong {
        /// Encoded byte length.
        length: usize,
        /// Largest encodable length.
        max: usize,
    },

    /// A collection has more entries than a 16-bit count can frame.
    #[error("too many {what}: {count} exceeds the {max} entry limit")]
    CountOverflow {
        /// What was being counted.
        what: &'static str,
        /// Actual number of entries.
        count: usize,
        /// Largest encodable count.
        max: usize,
    },

    /// The output file could not be written.
    #[error("failed to write {path}: {source}")]
    Storage {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An input file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An input file is not valid Tiled JSON.
    #[error("failed to parse {path}: {source}")]
    Json {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The map is structurally unusable.
    #[error("invalid map: {0}")]
    InvalidMap(String),

    /// A tile reference points past every tileset.
    #[error("layer '{layer}' references gid {gid}, which no tileset covers")]
    InvalidTileGid {
        /// Layer holding the reference.
        layer: String,
        /// Offending gid, flip flags removed.
        gid: u32,
    },

    /// A tile layer's data length does not match width * height.
    #[error("invalid layer size for layer '{0}': data length does not match layer dimensions")]
    InvalidLayerSize(String),
}

impl MapError {
    /// Create an unsupported property type error
    #[inline]
    pub fn unsupported(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnsupportedPropertyType {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Create a storage error for `path`
    #[inline]
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}
