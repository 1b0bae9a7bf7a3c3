// src/dag/cycles.rs

//! Explain *why* items were left unresolved by the sort.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::dag::graph::DepGraph;
use crate::store::QualifiedId;

/// Unresolved items split into actual cycles and their downstream victims.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Strongly connected groups of two or more items; each group sorted,
    /// groups sorted by their first member.
    pub cycles: Vec<Vec<QualifiedId>>,
    /// Unresolved items that are not on a cycle but depend (transitively)
    /// on one.
    pub blocked: Vec<QualifiedId>,
}

impl CycleReport {
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty() && self.blocked.is_empty()
    }
}

/// Find cycles among `unresolved` (the leftovers of [`crate::dag::sort`]).
pub fn find_cycles(graph: &DepGraph, unresolved: &[QualifiedId]) -> CycleReport {
    if unresolved.is_empty() {
        return CycleReport::default();
    }

    let index: BTreeMap<&QualifiedId, usize> = unresolved
        .iter()
        .enumerate()
        .map(|(i, id)| (id, i))
        .collect();

    let mut g: DiGraphMap<usize, ()> = DiGraphMap::new();
    for (id, &i) in &index {
        g.add_node(i);
        for dep in graph.dependencies_of(id) {
            if let Some(&j) = index.get(dep) {
                g.add_edge(i, j, ());
            }
        }
    }

    let mut on_cycle: BTreeSet<usize> = BTreeSet::new();
    let mut cycles: Vec<Vec<QualifiedId>> = tarjan_scc(&g)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            on_cycle.extend(scc.iter().copied());
            let mut members: Vec<QualifiedId> =
                scc.into_iter().map(|i| unresolved[i].clone()).collect();
            members.sort();
            members
        })
        .collect();
    cycles.sort();

    let mut blocked: Vec<QualifiedId> = unresolved
        .iter()
        .enumerate()
        .filter(|(i, _)| !on_cycle.contains(i))
        .map(|(_, id)| id.clone())
        .collect();
    blocked.sort();

    CycleReport { cycles, blocked }
}

/// Edges of `graph` that stay inside `members`, as `(from, to)` pairs, for
/// naming the offending dependencies of a cycle.
pub fn cycle_edges(graph: &DepGraph, members: &[QualifiedId]) -> Vec<(QualifiedId, QualifiedId)> {
    let set: BTreeSet<&QualifiedId> = members.iter().collect();
    let mut edges = Vec::new();
    for from in members {
        for to in graph.dependencies_of(from) {
            if set.contains(to) {
                edges.push((from.clone(), to.clone()));
            }
        }
    }
    edges
}
