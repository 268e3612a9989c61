//! Response DTOs for the render service
//!
//! JSON bodies for the operational endpoints. Rendered images are returned as
//! raw PNG bytes and have no DTO.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Requests answered from an existing cache file
    pub hits: u64,
    /// Requests that found no cache file
    pub misses: u64,
    /// Successful generations
    pub renders: u64,
    /// Failed generations
    pub render_failures: u64,
    /// Misses that waited on a generation already in flight
    pub coalesced: u64,
    /// Files currently in the cache directory
    pub cached_files: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from request counters and a file count
    pub fn new(stats: &CacheStats, cached_files: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            renders: stats.renders,
            render_failures: stats.render_failures,
            coalesced: stats.coalesced,
            cached_files,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
