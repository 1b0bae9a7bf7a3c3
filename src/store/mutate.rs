// src/store/mutate.rs

//! In-place item edits. Callers go through `SourceHandle`, which also sets
//! the dirty signal.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::{Result, TododagError};
use crate::fs::{write_atomic, FileSystem};
use crate::store::frontmatter::{self, Scalar, CURRENT_SCHEMA_VERSION};
use crate::store::item::{ItemId, Status};
use crate::store::reader::{is_item_file, parse_item, ReaderSettings};

/// Locate the file whose id (frontmatter or filename fallback) is `id`.
///
/// Files that fail to parse are skipped; they cannot be the item being
/// edited, and `validate` already reports them.
pub fn find_item_file(
    fs: &dyn FileSystem,
    source_dir: &Path,
    source: &str,
    id: &ItemId,
    settings: ReaderSettings,
) -> Result<PathBuf> {
    let mut paths: Vec<PathBuf> = fs
        .read_dir(source_dir)?
        .into_iter()
        .filter(|p| is_item_file(p) && fs.is_file(p))
        .collect();
    paths.sort();

    for path in paths {
        let text = fs.read_to_string(&path)?;
        let mut scratch = Vec::new();
        match parse_item(&text, &path, source, settings, &mut scratch) {
            Ok(item) if item.id() == id => return Ok(path),
            Ok(_) => {}
            Err(e) => debug!(path = ?path, error = %e, "skipping unparseable item file"),
        }
    }
    Err(TododagError::ItemNotFound(format!("{source}/{id}")))
}

/// Rewrite the `status` of the item file at `path`.
///
/// The file is upgraded to the current schema on the way (explicit
/// `issue_id` / `source`), unknown keys and the body are preserved, and the
/// write is atomic. Returns the previous status.
pub fn set_status(
    fs: &dyn FileSystem,
    path: &Path,
    source: &str,
    id: &ItemId,
    status: Status,
) -> Result<Status> {
    let text = fs.read_to_string(path)?;
    let (mut fm, body) =
        frontmatter::parse(&text).map_err(|msg| TododagError::item_parse(path, msg))?;

    let previous = fm.status;
    fm.status = status;
    fm.schema_version = CURRENT_SCHEMA_VERSION;
    fm.issue_id = Some(Scalar::Text(id.to_string()));
    fm.source = Some(source.to_string());

    let rendered = frontmatter::render(&fm, body)?;
    write_atomic(fs, path, rendered.as_bytes())?;

    info!(source, id = %id, from = %previous, to = %status, "item status updated");
    Ok(previous)
}
