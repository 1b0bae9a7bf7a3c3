// src/engine/workspace.rs

//! The todo tree as a whole, and read-only access to its sources.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::validate::is_valid_source_name;
use crate::config::ConfigFile;
use crate::engine::handle::SourceHandle;
use crate::engine::pipeline::{compute, BuildOutput, GraphSettings};
use crate::errors::{Result, TododagError};
use crate::fs::FileSystem;
use crate::manifest::{read_manifest, DirtySignal, ManifestPaths};
use crate::store::{discover_sources, read_source, ReaderSettings, SourceScan};

/// Owner of the todo tree. Hands out at most one [`SourceHandle`] per
/// source at a time.
#[derive(Debug)]
pub struct Workspace {
    config: ConfigFile,
    fs: Arc<dyn FileSystem>,
    claimed: Arc<Mutex<HashSet<String>>>,
}

impl Workspace {
    pub fn new(config: ConfigFile, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            config,
            fs,
            claimed: Arc::default(),
        }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn todos_root(&self) -> PathBuf {
        self.config.todos_root()
    }

    /// Source directories present under the todos root, sorted.
    pub fn sources(&self) -> Result<Vec<String>> {
        discover_sources(self.fs.as_ref(), &self.todos_root())
    }

    /// Read-only view of one source. Fails if the name is invalid or the
    /// directory does not exist.
    pub fn context(&self, source: &str) -> Result<SourceContext> {
        if !is_valid_source_name(source) {
            return Err(TododagError::SourceNotFound(format!(
                "{source} (not a valid source name)"
            )));
        }
        let root = self.todos_root();
        let dir = root.join(source);
        if !self.fs.is_dir(&dir) {
            return Err(TododagError::SourceNotFound(source.to_string()));
        }
        Ok(SourceContext {
            source: source.to_string(),
            paths: ManifestPaths::new(&root, &dir, &self.config.config.manifest_name),
            dir,
            fs: Arc::clone(&self.fs),
            reader: ReaderSettings {
                id_width: self.config.config.id_width,
                priority_levels: self.config.config.priority_levels,
            },
            graph: GraphSettings::from_config(&self.config),
            source_rank: self.config.source_rank(source),
        })
    }

    /// Claim the single-writer capability for `source`.
    ///
    /// Fails with [`TododagError::SourceBusy`] while another handle for the
    /// same source is alive. The claim is released when the handle drops.
    pub fn claim(&self, source: &str) -> Result<SourceHandle> {
        let context = self.context(source)?;
        {
            let mut claimed = self
                .claimed
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if !claimed.insert(source.to_string()) {
                return Err(TododagError::SourceBusy(source.to_string()));
            }
        }
        debug!(source, "source claimed");
        Ok(SourceHandle::new(context, Arc::clone(&self.claimed)))
    }

    /// Whether a handle for `source` is currently alive.
    pub fn is_claimed(&self, source: &str) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(source)
    }
}

/// Whether a source's manifest can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Signal clear and the manifest digest matches the items.
    Clean,
    /// Dirty signal set.
    Dirty,
    /// Signal clear, but items changed without setting it.
    Stale,
    /// No manifest has been written yet.
    Missing,
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Freshness::Clean => write!(f, "clean"),
            Freshness::Dirty => write!(f, "dirty"),
            Freshness::Stale => write!(f, "stale"),
            Freshness::Missing => write!(f, "missing"),
        }
    }
}

/// Paths and settings for one source; all operations here only read.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub source: String,
    pub dir: PathBuf,
    pub paths: ManifestPaths,
    pub fs: Arc<dyn FileSystem>,
    pub reader: ReaderSettings,
    pub graph: GraphSettings,
    pub source_rank: usize,
}

impl SourceContext {
    pub fn scan(&self) -> Result<SourceScan> {
        read_source(self.fs.as_ref(), &self.dir, &self.source, self.reader)
    }

    /// Read the items and compute the graph without writing anything.
    pub fn plan(&self) -> Result<(SourceScan, BuildOutput)> {
        let scan = self.scan()?;
        let output = compute(&self.source, &scan.items, self.source_rank, self.graph);
        Ok((scan, output))
    }

    pub fn dirty_signal(&self) -> &DirtySignal {
        &self.paths.dirty
    }

    pub fn freshness(&self) -> Result<Freshness> {
        let fs = self.fs.as_ref();
        if self.paths.dirty.is_set(fs) {
            return Ok(Freshness::Dirty);
        }
        let Some(manifest) = read_manifest(fs, &self.paths.manifest)? else {
            return Ok(Freshness::Missing);
        };
        let scan = self.scan()?;
        if crate::manifest::items_digest(&scan.items) == manifest.items_digest {
            Ok(Freshness::Clean)
        } else {
            Ok(Freshness::Stale)
        }
    }
}
