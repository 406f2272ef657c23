//! Committing encoded maps to disk.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::document::Document;
use crate::encode::encode;
use crate::error::MapError;
use crate::Result;

/// Write `bytes` to `path` so that readers see either the old file or the
/// complete new one.
///
/// The data goes to a temp file in the destination directory, is synced,
/// then renamed over `path`. On failure the temp file is removed.
pub fn commit(bytes: &[u8], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| MapError::storage(path, e))?;
    fill(&mut tmp, bytes).map_err(|e| MapError::storage(path, e))?;
    tmp.persist(path)
        .map_err(|e| MapError::storage(path, e.error))?;

    info!(path = %path.display(), bytes = bytes.len(), "wrote map");
    Ok(())
}

fn fill(tmp: &mut NamedTempFile, bytes: &[u8]) -> io::Result<()> {
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()
}

/// Encode `doc` and commit it to `path`, returning the bytes written.
pub fn write_map(doc: &Document, path: impl AsRef<Path>) -> Result<usize> {
    let bytes = encode(doc)?;
    commit(&bytes, path)?;
    Ok(bytes.len())
}
