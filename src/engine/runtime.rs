// src/engine/runtime.rs

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::engine::core::RebuildDebouncer;
use crate::engine::handle::{RebuildOutcome, SourceHandle};
use crate::engine::workspace::Workspace;
use crate::engine::WatchEvent;
use crate::errors::{Result, TododagError};

/// Outcome of one source in [`build_sources`].
#[derive(Debug)]
pub struct SourceBuildResult {
    pub source: String,
    pub result: Result<RebuildOutcome>,
}

/// Rebuild `sources` in parallel, one blocking task per source.
///
/// Sources are disjoint, so they share no mutable state; each task claims
/// its own handle. Results come back sorted by source name, and one failing
/// source does not stop the others.
pub async fn build_sources(
    workspace: Arc<Workspace>,
    sources: Vec<String>,
    force: bool,
) -> Vec<SourceBuildResult> {
    let mut set = JoinSet::new();

    for source in sources {
        let ws = Arc::clone(&workspace);
        set.spawn_blocking(move || {
            let result = ws
                .claim(&source)
                .and_then(|mut handle| handle.rebuild(force));
            SourceBuildResult { source, result }
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(r) => results.push(r),
            Err(e) => {
                error!(error = %e, "build task panicked or was cancelled");
                results.push(SourceBuildResult {
                    source: "<unknown>".to_string(),
                    result: Err(TododagError::Other(anyhow::anyhow!("build task failed: {e}"))),
                });
            }
        }
    }
    results.sort_by(|a, b| a.source.cmp(&b.source));
    results
}

/// Async shell around [`RebuildDebouncer`] for `tododag watch`.
///
/// Owns a [`SourceHandle`] for every source it has seen, so for the life of
/// the loop it is the single writer of those sources.
pub struct WatchRuntime {
    workspace: Arc<Workspace>,
    event_rx: mpsc::Receiver<WatchEvent>,
    debouncer: RebuildDebouncer,
    handles: BTreeMap<String, SourceHandle>,
}

impl fmt::Debug for WatchRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchRuntime")
            .field("debouncer", &self.debouncer)
            .field("handles", &self.handles.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl WatchRuntime {
    pub fn new(
        workspace: Arc<Workspace>,
        event_rx: mpsc::Receiver<WatchEvent>,
        quiet: Duration,
    ) -> Self {
        Self {
            workspace,
            event_rx,
            debouncer: RebuildDebouncer::new(quiet),
            handles: BTreeMap::new(),
        }
    }

    /// Bring every dirty source up to date once, then react to events until
    /// the channel closes or shutdown is requested. Sources still pending
    /// when the loop ends are rebuilt before returning.
    pub async fn run(mut self) -> Result<()> {
        info!("tododag watch runtime started");

        for source in self.workspace.sources()? {
            self.rebuild(&source, false).await;
        }

        loop {
            // A deadline that has already passed is handled here; a
            // `sleep_until` in the past is not ready on its first poll.
            self.flush_due().await;

            let event = match self.debouncer.next_deadline() {
                Some(at) => {
                    tokio::select! {
                        biased;
                        _ = tokio::time::sleep_until(tokio::time::Instant::from_std(at)) => continue,
                        ev = self.event_rx.recv() => ev,
                    }
                }
                None => self.event_rx.recv().await,
            };

            match event {
                Some(WatchEvent::ItemChanged { source, path }) => {
                    debug!(source = %source, ?path, "item changed");
                    if let Some(handle) = self.handle(&source) {
                        if let Err(e) = handle.mark_dirty() {
                            warn!(source = %source, error = %e, "failed to set dirty signal");
                        }
                        self.debouncer.note_change(&source, Instant::now());
                    }
                }
                Some(WatchEvent::Shutdown) => {
                    info!("shutdown requested; stopping watch runtime");
                    break;
                }
                None => {
                    info!("watch event channel closed; exiting");
                    break;
                }
            }
        }

        let pending = self.debouncer.take_all();
        if !pending.is_empty() {
            info!(?pending, "rebuilding pending sources before exit");
        }
        for source in pending {
            self.rebuild(&source, false).await;
        }
        Ok(())
    }

    async fn flush_due(&mut self) {
        for source in self.debouncer.take_due(Instant::now()) {
            self.rebuild(&source, false).await;
        }
    }

    /// Rebuild one source on the blocking pool. The handle moves into the
    /// task and comes back with the outcome.
    async fn rebuild(&mut self, source: &str, force: bool) {
        if self.handle(source).is_none() {
            return;
        }
        let Some(mut handle) = self.handles.remove(source) else {
            return;
        };

        let joined = tokio::task::spawn_blocking(move || {
            let outcome = handle.rebuild(force);
            (handle, outcome)
        })
        .await;

        let outcome = match joined {
            Ok((handle, outcome)) => {
                self.handles.insert(source.to_string(), handle);
                outcome
            }
            Err(e) => {
                // The handle went down with the task, so the claim is gone
                // and the next change claims the source again.
                error!(source, error = %e, "rebuild task panicked or was cancelled");
                return;
            }
        };

        match outcome {
            Ok(RebuildOutcome::Rebuilt(report)) => info!(
                source,
                items = report.manifest.item_count,
                has_cycles = report.manifest.has_cycles,
                "source rebuilt"
            ),
            Ok(RebuildOutcome::Skipped) => debug!(source, "source already clean"),
            Err(e) => error!(source, error = %e, "rebuild failed; will retry on next change"),
        }
    }

    fn handle(&mut self, source: &str) -> Option<&mut SourceHandle> {
        if !self.handles.contains_key(source) {
            match self.workspace.claim(source) {
                Ok(h) => {
                    self.handles.insert(source.to_string(), h);
                }
                Err(e) => {
                    warn!(source, error = %e, "cannot claim source; ignoring its changes");
                    return None;
                }
            }
        }
        self.handles.get_mut(source)
    }
}
