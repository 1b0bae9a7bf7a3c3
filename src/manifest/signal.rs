// src/manifest/signal.rs

//! Filesystem persistence for dirty signals.
//!
//! The in-process state lives on `SourceHandle`; these sentinels only carry
//! it across invocations.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;

/// Per-source sentinel file name.
pub const DIRTY_MARKER: &str = ".dirty";

/// Sentinel at the todos root for the (external) cross-source index.
pub const CROSS_SOURCE_MARKER: &str = ".cross-source-dirty";

/// An empty sentinel file whose presence means "dirty".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirtySignal {
    path: PathBuf,
}

impl DirtySignal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_source_dir(dir: &Path) -> Self {
        Self::new(dir.join(DIRTY_MARKER))
    }

    pub fn cross_source(todos_root: &Path) -> Self {
        Self::new(todos_root.join(CROSS_SOURCE_MARKER))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_set(&self, fs: &dyn FileSystem) -> bool {
        fs.exists(&self.path)
    }

    /// Idempotent.
    pub fn set(&self, fs: &dyn FileSystem) -> Result<()> {
        if !fs.exists(&self.path) {
            fs.write(&self.path, b"")?;
            debug!(path = ?self.path, "dirty signal set");
        }
        Ok(())
    }

    /// Idempotent.
    pub fn clear(&self, fs: &dyn FileSystem) -> Result<()> {
        if fs.exists(&self.path) {
            fs.remove_file(&self.path)?;
            debug!(path = ?self.path, "dirty signal cleared");
        }
        Ok(())
    }
}
