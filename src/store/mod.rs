// src/store/mod.rs

//! The todo store: item files on disk, one directory per source.
//!
//! ```text
//! <todos_root>/
//!   .cross-source-dirty
//!   work/
//!     .dirty
//!     manifest.json
//!     001-pending-p1-fix-login.md
//! ```

pub mod frontmatter;
pub mod item;
pub mod mutate;
pub mod reader;

pub use item::{Item, ItemId, Priority, QualifiedId, Status};
pub use reader::{discover_sources, read_source, ReadWarning, ReaderSettings, SourceScan};
