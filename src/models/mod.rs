//! Request and Response models for the render service
//!
//! This module defines the query DTO for `GET /`, the resolved parameter
//! tuple, and the JSON bodies of the operational endpoints.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{RenderParams, RenderQuery, DEFAULT_ARTIST, DEFAULT_COVER, DEFAULT_TITLE};
pub use responses::{HealthResponse, StatsResponse};
