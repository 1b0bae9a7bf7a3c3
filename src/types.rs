use std::str::FromStr;
use serde::Deserialize;

/// How the topological sorter treats items that become ready mid-drain.
///
/// - `Generational`: items released while the current ready set is being
///   drained are ordered among themselves and drained afterwards (BFS
///   layering, default).
/// - `Greedy`: a single global priority queue; a newly released item may
///   overtake lower-priority items that were ready earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStrategy {
    Generational,
    Greedy,
}

impl Default for SortStrategy {
    fn default() -> Self {
        SortStrategy::Generational
    }
}

impl FromStr for SortStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generational" => Ok(SortStrategy::Generational),
            "greedy" => Ok(SortStrategy::Greedy),
            other => Err(format!(
                "invalid sort_strategy: {other} (expected \"generational\" or \"greedy\")"
            )),
        }
    }
}

/// Persisted lifecycle of a source's manifest.
///
/// `Rebuilding` only exists in-process; on disk a source is either marked
/// dirty (sentinel present) or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Clean,
    Dirty,
    Rebuilding,
}

impl std::fmt::Display for SourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceState::Clean => write!(f, "clean"),
            SourceState::Dirty => write!(f, "dirty"),
            SourceState::Rebuilding => write!(f, "rebuilding"),
        }
    }
}
