// src/watch/mod.rs

//! File watching for `tododag watch`.
//!
//! Turns filesystem changes under the todos root into per-source
//! [`crate::engine::WatchEvent`]s. It knows nothing about graphs or
//! manifests; the runtime decides what to rebuild and when.

pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use patterns::{source_of, ItemPathFilter};
pub use watcher::{spawn_watcher, WatcherHandle};
