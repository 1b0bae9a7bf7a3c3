// src/manifest/model.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dag::{DanglingRef, Wave};
use crate::store::QualifiedId;

pub const MANIFEST_SCHEMA_VERSION: u32 = 2;

/// Per-source build artifact consumed by external schedulers.
///
/// Rewritten wholesale by every rebuild. Apart from `generated_at`, its
/// serialization is a pure function of the item set and configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,
    pub source: String,
    pub generated_at: DateTime<Utc>,
    /// blake3 digest of the graph-relevant item fields.
    pub items_digest: String,
    pub item_count: usize,
    pub topological_order: Vec<QualifiedId>,
    pub waves: Vec<Wave>,
    pub critical_path: Vec<QualifiedId>,
    pub has_cycles: bool,
    pub unresolved_deps: Vec<QualifiedId>,
    #[serde(default)]
    pub cycles: Vec<Vec<QualifiedId>>,
    pub cross_source_refs: Vec<QualifiedId>,
    #[serde(default)]
    pub warnings: ManifestWarnings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestWarnings {
    pub self_deps: Vec<QualifiedId>,
    pub dangling_refs: Vec<DanglingRef>,
}

impl Manifest {
    /// Pretty JSON with a trailing newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = serde_json::to_string_pretty(self)?;
        buf.push('\n');
        Ok(buf)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Manifest> {
        serde_json::from_str(text)
    }

    /// Wave number of `id`, if it was ordered.
    pub fn wave_of(&self, id: &QualifiedId) -> Option<usize> {
        self.waves
            .iter()
            .find(|w| w.todos.contains(id))
            .map(|w| w.wave)
    }
}
