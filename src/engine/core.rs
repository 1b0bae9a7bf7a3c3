// src/engine/core.rs

//! Pure debounce state for the watch loop.
//!
//! No Tokio, channels or filesystem here: the async shell in
//! [`crate::engine::runtime`] feeds it change notifications and clock
//! readings and asks which sources are due for a rebuild.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Tracks sources that changed recently and when they become due.
#[derive(Debug, Clone)]
pub struct RebuildDebouncer {
    quiet: Duration,
    pending: BTreeMap<String, Instant>,
}

impl RebuildDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: BTreeMap::new(),
        }
    }

    /// A change in `source` at `now` (re)starts its quiet period.
    pub fn note_change(&mut self, source: &str, now: Instant) {
        self.pending.insert(source.to_string(), now + self.quiet);
    }

    /// Remove and return every source whose quiet period has elapsed, sorted
    /// by name.
    pub fn take_due(&mut self, now: Instant) -> Vec<String> {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(source, _)| source.clone())
            .collect();
        for source in &due {
            self.pending.remove(source);
        }
        due
    }

    /// Remove and return every pending source, due or not, sorted by name.
    pub fn take_all(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending).into_keys().collect()
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.keys().map(String::as_str)
    }
}
