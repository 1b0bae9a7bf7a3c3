// src/dag/topo.rs

//! Kahn's algorithm with a deterministic priority comparator.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::dag::graph::{DepGraph, SortKey};
use crate::store::QualifiedId;
use crate::types::SortStrategy;

/// Outcome of [`sort`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortResult {
    /// Acyclic portion of the graph, dependencies before dependents.
    pub order: Vec<QualifiedId>,
    pub has_cycles: bool,
    /// Items whose in-degree never reached zero (cycle members and anything
    /// blocked behind a cycle), in comparator order.
    pub unresolved: Vec<QualifiedId>,
    /// Remaining in-degree of every node after the sort; zero for ordered
    /// items.
    pub in_degree: BTreeMap<QualifiedId, usize>,
}

/// Order the graph topologically.
///
/// Ready items are always taken highest-priority first using [`SortKey`]'s
/// ordering. See [`SortStrategy`] for how items released mid-drain are
/// queued. Cycles do not stop the sort: their members are left unresolved.
pub fn sort(graph: &DepGraph, strategy: SortStrategy) -> SortResult {
    let mut in_degree: BTreeMap<QualifiedId, usize> = graph
        .nodes()
        .map(|id| (id.clone(), graph.dependencies_of(id).len()))
        .collect();

    let ready: BTreeSet<SortKey> = graph
        .keys()
        .filter(|k| in_degree.get(&k.id) == Some(&0))
        .cloned()
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    match strategy {
        SortStrategy::Generational => {
            let mut current = ready;
            while !current.is_empty() {
                let mut next = BTreeSet::new();
                for key in current {
                    release_dependents(graph, &key.id, &mut in_degree, &mut next);
                    order.push(key.id);
                }
                current = next;
            }
        }
        SortStrategy::Greedy => {
            let mut queue = ready;
            while let Some(key) = queue.pop_first() {
                release_dependents(graph, &key.id, &mut in_degree, &mut queue);
                order.push(key.id);
            }
        }
    }

    let mut unresolved: Vec<SortKey> = graph
        .keys()
        .filter(|k| in_degree.get(&k.id).is_some_and(|d| *d > 0))
        .cloned()
        .collect();
    unresolved.sort();
    let unresolved: Vec<QualifiedId> = unresolved.into_iter().map(|k| k.id).collect();

    let has_cycles = order.len() < graph.len();
    if has_cycles {
        warn!(
            ordered = order.len(),
            unresolved = unresolved.len(),
            "dependency cycle detected; unresolved items receive no order"
        );
    } else {
        debug!(ordered = order.len(), "topological sort complete");
    }

    SortResult {
        order,
        has_cycles,
        unresolved,
        in_degree,
    }
}

fn release_dependents(
    graph: &DepGraph,
    id: &QualifiedId,
    in_degree: &mut BTreeMap<QualifiedId, usize>,
    queue: &mut BTreeSet<SortKey>,
) {
    for dependent in graph.dependents_of(id) {
        if let Some(d) = in_degree.get_mut(dependent) {
            *d = d.saturating_sub(1);
            if *d == 0 {
                if let Some(key) = graph.key(dependent) {
                    queue.insert(key.clone());
                }
            }
        }
    }
}
