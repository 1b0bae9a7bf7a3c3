// src/engine/pipeline.rs

//! Reader output -> validator -> sorter -> waves -> critical path.
//!
//! Everything here is a pure function of the item set and settings, which
//! is what makes a rebuild safe to retry.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::ConfigFile;
use crate::dag::{
    analyze, assign_waves, find_cycles, group_waves, limit_width, partition_edges, sort, validate,
    CpmAnalysis, CycleReport, DepGraph, SortResult, Validation, Wave,
};
use crate::manifest::{items_digest, Manifest, ManifestWarnings, MANIFEST_SCHEMA_VERSION};
use crate::store::{Item, QualifiedId};
use crate::types::SortStrategy;

/// Knobs of the graph stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphSettings {
    pub strategy: SortStrategy,
    pub max_wave_width: Option<usize>,
}

impl GraphSettings {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            strategy: cfg.config.sort_strategy,
            max_wave_width: cfg.config.max_wave_width,
        }
    }
}

/// Everything computed for one source.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub source: String,
    pub graph: DepGraph,
    pub validation: Validation,
    pub sort: SortResult,
    pub waves: Vec<Wave>,
    pub cpm: CpmAnalysis,
    pub cycles: CycleReport,
    pub cross_source_refs: BTreeSet<QualifiedId>,
    pub items_digest: String,
    pub item_count: usize,
}

impl BuildOutput {
    /// Self-deps, dangling refs and cycle groups.
    pub fn issue_count(&self) -> usize {
        self.validation.warning_count() + self.cycles.cycles.len()
    }

    pub fn critical_path(&self) -> &[QualifiedId] {
        &self.cpm.critical_path
    }

    pub fn manifest(&self, generated_at: DateTime<Utc>) -> Manifest {
        Manifest {
            schema_version: MANIFEST_SCHEMA_VERSION,
            source: self.source.clone(),
            generated_at,
            items_digest: self.items_digest.clone(),
            item_count: self.item_count,
            topological_order: self.sort.order.clone(),
            waves: self.waves.clone(),
            critical_path: self.cpm.critical_path.clone(),
            has_cycles: self.sort.has_cycles,
            unresolved_deps: self.sort.unresolved.clone(),
            cycles: self.cycles.cycles.clone(),
            cross_source_refs: self.cross_source_refs.iter().cloned().collect(),
            warnings: ManifestWarnings {
                self_deps: self.validation.self_deps.clone(),
                dangling_refs: self.validation.dangling_refs.clone(),
            },
        }
    }
}

/// Run every graph stage over the items of `source`.
///
/// `items` must all belong to `source`; `source_rank` is its tie-break
/// class rank.
pub fn compute(
    source: &str,
    items: &[Item],
    source_rank: usize,
    settings: GraphSettings,
) -> BuildOutput {
    let partition = partition_edges(source, items);
    let known: BTreeSet<QualifiedId> = items.iter().map(|i| i.qualified_id.clone()).collect();

    let validation = validate(partition.edges, &known);
    let graph = DepGraph::from_items(items, source_rank, &validation.edges);

    let sort_result = sort(&graph, settings.strategy);

    let mut wave_map = assign_waves(&sort_result.order, &graph);
    if let Some(width) = settings.max_wave_width {
        wave_map = limit_width(&wave_map, &sort_result.order, width);
    }
    let waves = group_waves(&wave_map, &sort_result.order);

    let cpm = analyze(&graph, &sort_result.order);
    let cycles = find_cycles(&graph, &sort_result.unresolved);

    debug!(
        source,
        items = items.len(),
        edges = graph.edge_count(),
        waves = waves.len(),
        critical = cpm.critical_path.len(),
        cross_source = partition.cross_source_refs.len(),
        "graph computed"
    );

    BuildOutput {
        source: source.to_string(),
        graph,
        validation,
        sort: sort_result,
        waves,
        cpm,
        cycles,
        cross_source_refs: partition.cross_source_refs,
        items_digest: items_digest(items),
        item_count: items.len(),
    }
}
