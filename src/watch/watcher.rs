// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::engine::WatchEvent;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{source_of, ItemPathFilter};

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` (the todos root) recursively and send
/// [`WatchEvent::ItemChanged`] for every changed path that `filter` accepts.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    filter: ItemPathFilter,
    runtime_tx: mpsc::Sender<WatchEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    // notify calls back on its own thread; hop into async land here.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("tododag: failed to forward notify event: {err}");
                }
            }
            Err(err) => eprintln!("tododag: file watch error: {err}"),
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("file watcher started on {:?}", root);

    let async_root = root.clone();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if matches!(event.kind, EventKind::Access(_)) {
                continue;
            }
            trace!(?event, "received notify event");

            for path in event.paths {
                let Some(rel) = relative_str(&async_root, &path) else {
                    continue;
                };
                if !filter.matches(&rel) {
                    continue;
                }
                let Some(source) = source_of(&rel) else {
                    continue;
                };
                debug!(source, path = %rel, "item file changed");
                let ev = WatchEvent::ItemChanged {
                    source: source.to_string(),
                    path,
                };
                if runtime_tx.send(ev).await.is_err() {
                    debug!("runtime channel closed; stopping watcher forwarder");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
