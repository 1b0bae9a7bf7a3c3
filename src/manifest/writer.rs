// src/manifest/writer.rs

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::Result;
use crate::fs::{write_atomic, FileSystem};
use crate::manifest::model::Manifest;
use crate::manifest::signal::DirtySignal;

/// Where one source's artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPaths {
    pub manifest: PathBuf,
    pub dirty: DirtySignal,
    pub cross_source_dirty: DirtySignal,
}

impl ManifestPaths {
    pub fn new(todos_root: &Path, source_dir: &Path, manifest_name: &str) -> Self {
        Self {
            manifest: source_dir.join(manifest_name),
            dirty: DirtySignal::for_source_dir(source_dir),
            cross_source_dirty: DirtySignal::cross_source(todos_root),
        }
    }
}

/// Persist `manifest` atomically, then clear the source's dirty signal.
///
/// Readers see either the previous manifest or this one. If anything fails
/// before the rename completes the dirty signal is untouched, so the source
/// stays eligible for a retry. When the manifest references other sources,
/// the cross-source signal is raised afterwards.
pub fn write_manifest(fs: &dyn FileSystem, paths: &ManifestPaths, manifest: &Manifest) -> Result<()> {
    let json = manifest.to_json()?;
    write_atomic(fs, &paths.manifest, json.as_bytes())?;

    paths.dirty.clear(fs)?;

    if !manifest.cross_source_refs.is_empty() {
        if let Err(err) = paths.cross_source_dirty.set(fs) {
            // The manifest itself is complete; only the optional index lags.
            warn!(source = %manifest.source, error = %err, "failed to set cross-source dirty signal");
        }
    }

    info!(
        source = %manifest.source,
        path = ?paths.manifest,
        items = manifest.item_count,
        waves = manifest.waves.len(),
        has_cycles = manifest.has_cycles,
        "manifest written"
    );
    Ok(())
}

/// Read a manifest back, `None` if there is none yet.
pub fn read_manifest(fs: &dyn FileSystem, path: &Path) -> Result<Option<Manifest>> {
    if !fs.exists(path) {
        return Ok(None);
    }
    let text = fs.read_to_string(path)?;
    Ok(Some(Manifest::from_json(&text)?))
}
