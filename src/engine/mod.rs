// src/engine/mod.rs

//! Orchestration of source rebuilds.
//!
//! - [`pipeline`] is the pure read -> validate -> sort -> waves -> CPM chain.
//! - [`workspace`] owns the todo tree and hands out per-source handles.
//! - [`handle`] is the single-writer capability for one source.
//! - [`core`] holds the debounce state of the watch loop.
//! - [`runtime`] is the async shell: parallel builds and the watch loop.

use std::path::PathBuf;

pub mod core;
pub mod handle;
pub mod pipeline;
pub mod runtime;
pub mod workspace;

pub use core::RebuildDebouncer;
pub use handle::{RebuildOutcome, RebuildReport, SourceHandle};
pub use pipeline::{compute, BuildOutput, GraphSettings};
pub use runtime::{build_sources, SourceBuildResult, WatchRuntime};
pub use workspace::{Freshness, SourceContext, Workspace};

/// Events delivered to the [`WatchRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// An item file in `source` was created, modified or removed.
    ItemChanged { source: String, path: PathBuf },
    /// Stop the loop (Ctrl-C).
    Shutdown,
}
