// src/manifest/mod.rs

//! Versioned per-source manifest, its atomic writer and the dirty signals
//! that say whether it is current.

pub mod digest;
pub mod model;
pub mod signal;
pub mod writer;

pub use digest::items_digest;
pub use model::{Manifest, ManifestWarnings, MANIFEST_SCHEMA_VERSION};
pub use signal::{DirtySignal, CROSS_SOURCE_MARKER, DIRTY_MARKER};
pub use writer::{read_manifest, write_manifest, ManifestPaths};
