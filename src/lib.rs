#![warn(missing_docs)]

//! Tilemap encoder for the compact little-endian `.mdat` container, with a
//! Tiled JSON front end.

pub mod document;
pub mod encode;
mod error;
mod loader {
    pub mod json_loader;
}
mod storage;

pub use document::{
    Document, Layer, LayerKind, MapObject, ObjectShape, Point, Properties, PropertyValue, Tile,
    Tileset,
};
pub use encode::{encode, MAGIC};
pub use error::MapError;
pub use loader::json_loader::{load_document, load_document_from_str};
pub use storage::{commit, write_map};

/// Result type for map loading and encoding
pub type Result<T> = std::result::Result<T, MapError>;
