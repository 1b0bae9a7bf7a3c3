// src/dag/waves.rs

//! Longest-path wave labelling.
//!
//! Waves come from dependency depth, never from capacity batching, so two
//! linked items never share a wave. [`limit_width`] only ever splits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dag::graph::DepGraph;
use crate::store::QualifiedId;

/// `id -> 1-indexed wave number`.
pub type WaveMap = BTreeMap<QualifiedId, usize>;

/// One group of mutually independent items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    pub wave: usize,
    pub todos: Vec<QualifiedId>,
}

/// Label every item of `order` with its wave: 1 without dependencies,
/// otherwise one more than its deepest dependency.
///
/// `order` must list dependencies before dependents (the output of
/// [`crate::dag::sort`]); unordered items get no wave.
pub fn assign_waves(order: &[QualifiedId], graph: &DepGraph) -> WaveMap {
    let mut waves = WaveMap::new();
    for id in order {
        let wave = graph
            .dependencies_of(id)
            .iter()
            .filter_map(|dep| waves.get(dep))
            .max()
            .map_or(1, |w| w + 1);
        waves.insert(id.clone(), wave);
    }
    waves
}

/// Split any wave with more than `max_width` items into consecutive
/// sub-waves and renumber all waves from 1.
///
/// Items keep their relative topological order, and each item stays after
/// every wave its dependencies were in, so the boundary invariant holds.
pub fn limit_width(waves: &WaveMap, order: &[QualifiedId], max_width: usize) -> WaveMap {
    let max_width = max_width.max(1);
    let mut out = WaveMap::new();
    let mut next_wave = 1;

    for group in group_waves(waves, order) {
        for chunk in group.todos.chunks(max_width) {
            for id in chunk {
                out.insert(id.clone(), next_wave);
            }
            next_wave += 1;
        }
    }
    out
}

/// Turn a wave map into ordered wave groups; items inside a wave follow
/// `order`.
pub fn group_waves(waves: &WaveMap, order: &[QualifiedId]) -> Vec<Wave> {
    let mut groups: BTreeMap<usize, Vec<QualifiedId>> = BTreeMap::new();
    for id in order {
        if let Some(w) = waves.get(id) {
            groups.entry(*w).or_default().push(id.clone());
        }
    }
    groups
        .into_iter()
        .map(|(wave, todos)| Wave { wave, todos })
        .collect()
}
