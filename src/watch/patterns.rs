// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

/// Which paths (relative to the todos root) are item files worth a rebuild.
///
/// Only `<source>/<file>.md` one level deep counts; dot-directories,
/// dotfiles (the dirty signals), temp files and the manifest itself are
/// ignored so the watcher never reacts to its own writes.
#[derive(Clone)]
pub struct ItemPathFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl fmt::Debug for ItemPathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemPathFilter").finish_non_exhaustive()
    }
}

impl ItemPathFilter {
    /// Build the filter. `manifest_name` is excluded in every source.
    pub fn new(manifest_name: &str) -> Result<Self> {
        let include = build_globset(&["*/*.md".to_string()])?;
        let exclude = build_globset(&[
            ".*/**".to_string(),
            "*/.*".to_string(),
            "**/*.tmp".to_string(),
            format!("*/{manifest_name}"),
        ])?;
        Ok(Self { include, exclude })
    }

    /// Returns true if a change at `rel_path` (e.g. `"work/003-x.md"`)
    /// should mark its source dirty.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.include.is_match(rel_path) && !self.exclude.is_match(rel_path)
    }
}

/// Source directory of a root-relative item path.
pub fn source_of(rel_path: &str) -> Option<&str> {
    let (source, rest) = rel_path.split_once('/')?;
    if source.is_empty() || rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(source)
}

/// `*` must not cross `/`, so `*/*.md` stays one level deep.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob: Glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
