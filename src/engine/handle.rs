// src/engine/handle.rs

//! Single-writer capability for one source.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::engine::pipeline::BuildOutput;
use crate::engine::workspace::SourceContext;
use crate::errors::Result;
use crate::manifest::{write_manifest, Manifest};
use crate::store::mutate;
use crate::store::{ItemId, ReadWarning, Status};
use crate::types::SourceState;

/// Result of [`SourceHandle::rebuild`].
#[derive(Debug, Clone)]
pub enum RebuildOutcome {
    /// The source was clean and no rebuild was forced.
    Skipped,
    Rebuilt(Box<RebuildReport>),
}

#[derive(Debug, Clone)]
pub struct RebuildReport {
    pub manifest: Manifest,
    pub output: BuildOutput,
    pub read_warnings: Vec<ReadWarning>,
}

/// The only way to mutate a source: mark it dirty, edit items, rebuild its
/// manifest.
///
/// Obtained from [`crate::engine::Workspace::claim`]; not `Clone`, and
/// every mutation takes `&mut self`, so one source has one writer at a time
/// within a process. Dropping the handle releases the claim.
pub struct SourceHandle {
    context: SourceContext,
    state: SourceState,
    claims: Arc<Mutex<HashSet<String>>>,
}

impl fmt::Debug for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceHandle")
            .field("source", &self.context.source)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SourceHandle {
    pub(crate) fn new(context: SourceContext, claims: Arc<Mutex<HashSet<String>>>) -> Self {
        let mut handle = Self {
            context,
            state: SourceState::Dirty,
            claims,
        };
        handle.refresh_state();
        handle
    }

    pub fn source(&self) -> &str {
        &self.context.source
    }

    pub fn context(&self) -> &SourceContext {
        &self.context
    }

    pub fn state(&self) -> SourceState {
        self.state
    }

    /// Re-derive the state from disk: dirty if the signal is set or no
    /// manifest exists yet.
    pub fn refresh_state(&mut self) -> SourceState {
        let fs = self.context.fs.as_ref();
        let dirty = self.context.paths.dirty.is_set(fs) || !fs.exists(&self.context.paths.manifest);
        self.state = if dirty {
            SourceState::Dirty
        } else {
            SourceState::Clean
        };
        self.state
    }

    /// Record that an item of this source changed outside the handle.
    pub fn mark_dirty(&mut self) -> Result<()> {
        self.context.paths.dirty.set(self.context.fs.as_ref())?;
        if self.state != SourceState::Dirty {
            info!(source = %self.context.source, from = %self.state, "source marked dirty");
        }
        self.state = SourceState::Dirty;
        Ok(())
    }

    /// Rewrite one item's status and mark the source dirty. Returns the
    /// previous status.
    pub fn set_status(&mut self, id: &ItemId, status: Status) -> Result<Status> {
        let fs = Arc::clone(&self.context.fs);
        let path = mutate::find_item_file(
            fs.as_ref(),
            &self.context.dir,
            &self.context.source,
            id,
            self.context.reader,
        )?;
        // Signal before edit: a crash in between must not leave a clean
        // signal over a changed item.
        self.mark_dirty()?;
        mutate::set_status(fs.as_ref(), &path, &self.context.source, id, status)
    }

    /// Rebuild the manifest if the source is dirty (or `force` is set).
    ///
    /// `Dirty -> Rebuilding -> Clean` on success; on any failure the state
    /// returns to `Dirty` and the dirty signal stays set, so a retry is
    /// always possible.
    pub fn rebuild(&mut self, force: bool) -> Result<RebuildOutcome> {
        if self.refresh_state() == SourceState::Clean && !force {
            debug!(source = %self.context.source, "source clean; skipping rebuild");
            return Ok(RebuildOutcome::Skipped);
        }

        self.state = SourceState::Rebuilding;
        debug!(source = %self.context.source, force, "rebuilding manifest");

        match self.try_rebuild() {
            Ok(report) => {
                self.state = SourceState::Clean;
                Ok(RebuildOutcome::Rebuilt(Box::new(report)))
            }
            Err(err) => {
                warn!(source = %self.context.source, error = %err, "rebuild failed; source stays dirty");
                self.state = SourceState::Dirty;
                if let Err(signal_err) = self.context.paths.dirty.set(self.context.fs.as_ref()) {
                    warn!(
                        source = %self.context.source,
                        error = %signal_err,
                        "could not persist dirty signal after failed rebuild"
                    );
                }
                Err(err)
            }
        }
    }

    fn try_rebuild(&self) -> Result<RebuildReport> {
        let (scan, output) = self.context.plan()?;
        let manifest = output.manifest(Utc::now());
        write_manifest(self.context.fs.as_ref(), &self.context.paths, &manifest)?;
        Ok(RebuildReport {
            manifest,
            output,
            read_warnings: scan.warnings,
        })
    }
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        let mut claims = self
            .claims
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        claims.remove(&self.context.source);
        debug!(source = %self.context.source, "source released");
    }
}
