// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet};

use crate::store::{Item, Priority, QualifiedId};

/// `id -> set of ids`, used for both directions of the graph.
pub type EdgeMap = BTreeMap<QualifiedId, BTreeSet<QualifiedId>>;

static NO_EDGES: BTreeSet<QualifiedId> = BTreeSet::new();

/// Sort key of a node. The derived ordering *is* the scheduling comparator:
/// priority class, then source class rank, then id (numeric, then string).
/// It is a strict total order because qualified ids are unique.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub priority: Priority,
    pub source_rank: usize,
    pub id: QualifiedId,
}

/// Intra-source edges of one source, with cross-source references split off.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Every item of the source has an entry, possibly empty.
    pub edges: EdgeMap,
    /// Dependencies and related links pointing into other sources.
    pub cross_source_refs: BTreeSet<QualifiedId>,
}

/// Split item dependencies into this source's edge set and the references
/// that leave the source. Cross-source targets never reach the validator and
/// are never reported as dangling.
pub fn partition_edges(source: &str, items: &[Item]) -> Partition {
    let mut partition = Partition::default();

    for item in items {
        let entry = partition
            .edges
            .entry(item.qualified_id.clone())
            .or_default();
        for dep in &item.dependencies {
            if dep.is_in(source) {
                entry.insert(dep.clone());
            } else {
                partition.cross_source_refs.insert(dep.clone());
            }
        }
        for rel in &item.related {
            if !rel.is_in(source) {
                partition.cross_source_refs.insert(rel.clone());
            }
        }
    }

    partition
}

/// Per-source dependency graph: edge `A -> B` means "A depends on B".
///
/// Built from *validated* edges only. Holds both directions plus the sort
/// key of every node; no recursion is needed to walk it.
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    keys: BTreeMap<QualifiedId, SortKey>,
    dependencies: EdgeMap,
    dependents: EdgeMap,
}

impl DepGraph {
    /// Build the graph. Edges whose endpoints are not nodes are dropped, so
    /// an unvalidated edge map cannot introduce phantom nodes.
    pub fn new(nodes: impl IntoIterator<Item = SortKey>, edges: &EdgeMap) -> Self {
        let keys: BTreeMap<QualifiedId, SortKey> =
            nodes.into_iter().map(|k| (k.id.clone(), k)).collect();

        let mut dependencies: EdgeMap = BTreeMap::new();
        let mut dependents: EdgeMap = BTreeMap::new();

        for id in keys.keys() {
            dependencies.insert(id.clone(), BTreeSet::new());
            dependents.insert(id.clone(), BTreeSet::new());
        }

        for (from, deps) in edges {
            if !keys.contains_key(from) {
                continue;
            }
            for to in deps {
                if to == from || !keys.contains_key(to) {
                    continue;
                }
                if let Some(set) = dependencies.get_mut(from) {
                    set.insert(to.clone());
                }
                if let Some(set) = dependents.get_mut(to) {
                    set.insert(from.clone());
                }
            }
        }

        Self {
            keys,
            dependencies,
            dependents,
        }
    }

    /// Convenience constructor from items that all share one source rank.
    pub fn from_items(items: &[Item], source_rank: usize, edges: &EdgeMap) -> Self {
        let nodes = items.iter().map(|item| SortKey {
            priority: item.priority,
            source_rank,
            id: item.qualified_id.clone(),
        });
        Self::new(nodes, edges)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, id: &QualifiedId) -> bool {
        self.keys.contains_key(id)
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &QualifiedId> {
        self.keys.keys()
    }

    pub fn key(&self, id: &QualifiedId) -> Option<&SortKey> {
        self.keys.get(id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SortKey> {
        self.keys.values()
    }

    /// Items `id` is blocked by.
    pub fn dependencies_of(&self, id: &QualifiedId) -> &BTreeSet<QualifiedId> {
        self.dependencies.get(id).unwrap_or(&NO_EDGES)
    }

    /// Items blocked by `id`.
    pub fn dependents_of(&self, id: &QualifiedId) -> &BTreeSet<QualifiedId> {
        self.dependents.get(id).unwrap_or(&NO_EDGES)
    }

    pub fn edge_count(&self) -> usize {
        self.dependencies.values().map(BTreeSet::len).sum()
    }
}
