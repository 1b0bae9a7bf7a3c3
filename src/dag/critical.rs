// src/dag/critical.rs

//! Critical path method over the intra-source edges of ordered items.

use std::collections::{BTreeMap, BTreeSet};

use crate::dag::graph::DepGraph;
use crate::store::QualifiedId;

/// Earliest/latest start times of every ordered item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpmAnalysis {
    pub earliest: BTreeMap<QualifiedId, usize>,
    pub latest: BTreeMap<QualifiedId, usize>,
    /// Zero-slack items in topological order.
    pub critical_path: Vec<QualifiedId>,
}

impl CpmAnalysis {
    pub fn slack(&self, id: &QualifiedId) -> Option<usize> {
        let est = self.earliest.get(id)?;
        let lst = self.latest.get(id)?;
        Some(lst.saturating_sub(*est))
    }
}

/// Forward pass (EST) then backward pass (LST); items with EST == LST are
/// critical. Unordered (cyclic) items and anything outside the graph are
/// ignored on both passes.
pub fn analyze(graph: &DepGraph, order: &[QualifiedId]) -> CpmAnalysis {
    if graph.is_empty() || order.is_empty() {
        return CpmAnalysis::default();
    }

    let ordered: BTreeSet<&QualifiedId> = order.iter().collect();

    let mut earliest: BTreeMap<QualifiedId, usize> = BTreeMap::new();
    for id in order {
        let est = graph
            .dependencies_of(id)
            .iter()
            .filter(|d| ordered.contains(d))
            .filter_map(|d| earliest.get(d))
            .max()
            .map_or(0, |e| e + 1);
        earliest.insert(id.clone(), est);
    }

    // `order` is non-empty, so there is at least one EST.
    let horizon = earliest.values().copied().max().unwrap_or(0);

    let mut latest: BTreeMap<QualifiedId, usize> = BTreeMap::new();
    for id in order.iter().rev() {
        let lst = graph
            .dependents_of(id)
            .iter()
            .filter(|d| ordered.contains(d))
            .filter_map(|d| latest.get(d))
            .min()
            .map_or(horizon, |l| l.saturating_sub(1));
        latest.insert(id.clone(), lst);
    }

    let critical_path = order
        .iter()
        .filter(|id| earliest.get(*id) == latest.get(*id))
        .cloned()
        .collect();

    CpmAnalysis {
        earliest,
        latest,
        critical_path,
    }
}

/// Zero-slack items; `[]` for an empty graph.
pub fn critical_path(graph: &DepGraph, order: &[QualifiedId]) -> Vec<QualifiedId> {
    analyze(graph, order).critical_path
}
