//! API Handlers
//!
//! HTTP request handlers for each render service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{HealthResponse, RenderQuery, StatsResponse};
use crate::service::RenderService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-backed renderer
    pub service: Arc<RenderService>,
}

impl AppState {
    /// Creates a new AppState around a render service.
    pub fn new(service: RenderService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Creates a new AppState from configuration, using the headless
    /// browser engine.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        Ok(Self::new(RenderService::from_config(config)?))
    }
}

/// Handler for GET /
///
/// Returns the song card PNG, from the cache when possible.
pub async fn render_handler(
    State(state): State<AppState>,
    Query(query): Query<RenderQuery>,
) -> Result<Response> {
    debug!("Request args: {:?}", query);
    let params = query.into_params();

    let png = state.service.get_or_render(&params).await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Handler for GET /stats
///
/// Returns request counters and the current cache file count.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.service.stats().await;
    let cached_files = match state.service.store().len().await {
        Ok(count) => count,
        Err(e) => {
            warn!("Error counting cache files: {}", e);
            0
        }
    };

    Json(StatsResponse::new(&stats, cached_files))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
