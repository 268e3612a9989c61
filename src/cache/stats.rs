//! Cache Statistics Module
//!
//! Tracks request outcomes: hits, misses, renders and coalesced waits.

use serde::Serialize;

// == Cache Stats ==
/// Tracks render cache performance counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Requests served from an existing cache file
    pub hits: u64,
    /// Requests that found no cache file
    pub misses: u64,
    /// Images generated and stored
    pub renders: u64,
    /// Generations that ended in an error
    pub render_failures: u64,
    /// Misses that joined a generation started by another request
    pub coalesced: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_render(&mut self) {
        self.renders += 1;
    }

    pub fn record_render_failure(&mut self) {
        self.render_failures += 1;
    }

    pub fn record_coalesced(&mut self) {
        self.coalesced += 1;
    }
}
