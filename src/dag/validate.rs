// src/dag/validate.rs

//! Structural clean-up of a source's edge set before ordering.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dag::graph::EdgeMap;
use crate::store::QualifiedId;

/// An edge whose target does not exist in the source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DanglingRef {
    pub from: QualifiedId,
    pub to: QualifiedId,
}

/// Result of [`validate`]: the cleaned edges plus what was removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub edges: EdgeMap,
    /// Items that listed themselves as a dependency.
    pub self_deps: Vec<QualifiedId>,
    pub dangling_refs: Vec<DanglingRef>,
}

impl Validation {
    pub fn warning_count(&self) -> usize {
        self.self_deps.len() + self.dangling_refs.len()
    }
}

/// Remove self-loops and edges to unknown ids.
///
/// `edges` must already be restricted to intra-source targets (see
/// [`crate::dag::partition_edges`]). Never fails; an empty map yields an
/// empty result.
pub fn validate(edges: EdgeMap, known_ids: &BTreeSet<QualifiedId>) -> Validation {
    let mut out = Validation::default();

    for (id, deps) in edges {
        let mut kept = BTreeSet::new();
        for dep in deps {
            if dep == id {
                warn!(item = %id, "removing self-dependency");
                out.self_deps.push(id.clone());
            } else if !known_ids.contains(&dep) {
                warn!(item = %id, dep = %dep, "removing dangling dependency");
                out.dangling_refs.push(DanglingRef {
                    from: id.clone(),
                    to: dep,
                });
            } else {
                kept.insert(dep);
            }
        }
        out.edges.insert(id, kept);
    }

    out
}
