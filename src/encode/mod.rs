//! `.mdat` encoding.
//!
//! The document is flattened once into a [`FieldList`]. Its size allocates
//! the output buffer and the same list is replayed into it, so the size pass
//! and the write pass cannot drift apart.
//!
//! # Wire Layout
//!
//! All integers are little-endian. `str` is a word byte length followed by
//! that many raw UTF-8 bytes.
//!
//! ```text
//! header      magic str, width, height, tileWidth, tileHeight, layerCount (words)
//! tile layer  name str, tileId word * (width * height), row-major
//! obj layer   name str, objectCount word, then per object:
//!               x, y, w, h words, name str, type str, shape word,
//!               pointCount word, (x, y words) * pointCount, properties
//! properties  count word, then per entry: key str, tag word, payload
//!               (bool word | int dword | float f32 | str)
//! tilesets    count word, then per tileset: name str, tileCount word,
//!               then per tile: type str, srcX word, srcY word, properties
//! ```

pub mod field;
pub mod map;
pub mod properties;
pub mod writer;

use tracing::debug;

use crate::document::Document;
use crate::error::MapError;
use crate::Result;

pub use field::{EncodedField, FieldList};
pub use properties::PropertyTag;
pub use writer::PrimitiveWriter;

/// Format tag written at the start of every file.
pub const MAGIC: &str = "MOROS1138_MAP_VERSION1";

/// Encode `doc` into a complete `.mdat` image.
pub fn encode(doc: &Document) -> Result<Vec<u8>> {
    let fields = map::encode_map(doc)?;
    let size = fields.byte_len();
    debug!(fields = fields.len(), bytes = size, "flattened map");

    let mut buf = vec![0u8; size];
    let written = {
        let mut w = PrimitiveWriter::new(&mut buf);
        for field in fields.as_slice() {
            w.write_field(field);
        }
        w.offset()
    };

    if written != size {
        return Err(MapError::SizeMismatch {
            expected: size,
            actual: written,
        });
    }
    Ok(buf)
}
