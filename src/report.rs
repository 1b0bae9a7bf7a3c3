// src/report.rs

//! Human-readable output for `validate`, `graph` and `status`.
//!
//! Renderers return `String`s; `lib.rs` decides where they go.

use std::fmt::Write as _;

use crate::dag::cycles::cycle_edges;
use crate::engine::{BuildOutput, Freshness};
use crate::store::ReadWarning;

/// Issues found for one source by `tododag validate`.
pub fn render_validation(output: &BuildOutput, read_warnings: &[ReadWarning]) -> String {
    let mut out = String::new();
    let issues = output.issue_count() + read_warnings.len();

    let _ = writeln!(
        out,
        "{}: {} items, {} edges, {} issue(s)",
        output.source,
        output.item_count,
        output.graph.edge_count(),
        issues
    );

    for w in read_warnings {
        let _ = writeln!(out, "  read warning: {:?}: {}", w.path, w.message);
    }
    for id in &output.validation.self_deps {
        let _ = writeln!(out, "  self dependency: {id}");
    }
    for d in &output.validation.dangling_refs {
        let _ = writeln!(out, "  dangling dependency: {} -> {} (no such item)", d.from, d.to);
    }
    for members in &output.cycles.cycles {
        let names: Vec<String> = members.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "  cycle: {}", names.join(", "));
        for (from, to) in cycle_edges(&output.graph, members) {
            let _ = writeln!(out, "    {from} depends on {to}");
        }
    }
    if !output.cycles.blocked.is_empty() {
        let names: Vec<String> = output.cycles.blocked.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "  blocked by a cycle: {}", names.join(", "));
    }
    if !output.cross_source_refs.is_empty() {
        let names: Vec<String> = output.cross_source_refs.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "  cross-source refs (not validated): {}", names.join(", "));
    }
    out
}

/// `tododag graph`: topological order, or waves with `--waves`.
///
/// Critical-path items are starred; each line carries priority and slack.
pub fn render_graph(output: &BuildOutput, by_wave: bool) -> String {
    let mut out = String::new();
    let critical = output.critical_path();

    let line = |out: &mut String, id: &crate::store::QualifiedId| {
        let mark = if critical.contains(id) { '*' } else { ' ' };
        let priority = output
            .graph
            .key(id)
            .map(|k| k.priority.to_string())
            .unwrap_or_default();
        let slack = output
            .cpm
            .slack(id)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "  {mark} {id}  {priority}  slack={slack}");
    };

    if by_wave {
        for wave in &output.waves {
            let _ = writeln!(out, "wave {}:", wave.wave);
            for id in &wave.todos {
                line(&mut out, id);
            }
        }
    } else {
        for id in &output.sort.order {
            line(&mut out, id);
        }
    }

    if !output.critical_path().is_empty() {
        let names: Vec<String> = critical.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "critical path: {}", names.join(" -> "));
    }
    if output.sort.has_cycles {
        let names: Vec<String> = output.sort.unresolved.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "unresolved (cycle): {}", names.join(", "));
    }
    out
}

/// One line of `tododag status`.
pub fn render_status_line(source: &str, freshness: Freshness) -> String {
    format!("{source:<16} {freshness}")
}
