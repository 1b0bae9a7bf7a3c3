// src/dag/mod.rs

//! Dependency graph construction, validation and scheduling.
//!
//! - [`graph`] partitions item dependencies and holds the per-source DAG.
//! - [`validate`] drops self-loops and dangling edges.
//! - [`topo`] orders the graph (Kahn's algorithm).
//! - [`waves`] turns the order into parallel execution waves.
//! - [`critical`] finds the zero-slack chain.
//! - [`cycles`] explains unresolved items.

pub mod critical;
pub mod cycles;
pub mod graph;
pub mod topo;
pub mod validate;
pub mod waves;

pub use critical::{analyze, critical_path, CpmAnalysis};
pub use cycles::{find_cycles, CycleReport};
pub use graph::{partition_edges, DepGraph, EdgeMap, Partition, SortKey};
pub use topo::{sort, SortResult};
pub use validate::{validate, DanglingRef, Validation};
pub use waves::{assign_waves, group_waves, limit_width, Wave, WaveMap};
