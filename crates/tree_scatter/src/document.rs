//! JSON serialization and atomic persistence of [`SceneDocument`]s.
//!
//! [`serialize`] honours the document's `pretty_print` flag; [`parse`] accepts either
//! layout. [`persist`] writes to a temporary file next to the destination and renames it
//! into place, so a failed write never leaves a truncated document behind.
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::scene::SceneDocument;

/// Indentation used for pretty-printed documents.
pub const PRETTY_INDENT: &[u8] = b"    ";

/// Serializes `document` to JSON, indented when `document.pretty_print` is set.
pub fn serialize(document: &SceneDocument) -> Result<String> {
    if !document.pretty_print {
        return Ok(serde_json::to_string(document)?);
    }
    let mut buf = Vec::with_capacity(256 + document.objects.len() * 512);
    let formatter = PrettyFormatter::with_indent(PRETTY_INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| Error::Other(format!("serialized document is not UTF-8: {e}")))
}

/// Parses a document produced by [`serialize`], regardless of formatting.
pub fn parse(text: &str) -> Result<SceneDocument> {
    Ok(serde_json::from_str(text)?)
}

/// Atomically replaces `path` with `text`.
///
/// Missing parent directories are created. Any failure is reported as
/// [`Error::Persist`] carrying the destination path.
pub fn persist(text: &str, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let wrap = |source: std::io::Error| Error::Persist {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(wrap)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(wrap)?;
    tmp.write_all(text.as_bytes()).map_err(wrap)?;
    tmp.as_file().sync_all().map_err(wrap)?;
    debug!("Renaming {} into {}.", tmp.path().display(), path.display());
    tmp.persist(path).map_err(|e| wrap(e.error))?;
    Ok(())
}

/// Serializes and persists `document` to `path`.
pub fn save(document: &SceneDocument, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = serialize(document)?;
    persist(&text, path)?;
    info!(
        "Saved {} objects ({} bytes) to {}.",
        document.objects.len(),
        text.len(),
        path.display()
    );
    Ok(())
}

/// Reads and parses a document from `path`.
pub fn load(path: impl AsRef<Path>) -> Result<SceneDocument> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}
