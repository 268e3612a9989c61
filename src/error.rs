//! Error types for the render service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

// == Render Error Enum ==
/// Unified error type for the render service.
///
/// `Clone` so that one generation outcome can be handed to every request
/// waiting on the same cache key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Upstream lyrics/cover host unreachable or returned a failure status
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    /// Cover image could not be obtained
    #[error("Cover unavailable: {0}")]
    CoverUnavailable(String),

    /// Template or font file missing or unreadable
    #[error("Asset unavailable: {0}")]
    AssetLoad(String),

    /// Headless browser failed to launch or capture
    #[error("Render engine failed: {0}")]
    RenderEngine(String),

    /// Rendered image could not be written to the cache
    #[error("Cache write failed: {0}")]
    CacheWrite(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the render service.
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variant_maps_to_500() {
        let errors = [
            RenderError::UpstreamFetch("x".into()),
            RenderError::CoverUnavailable("x".into()),
            RenderError::AssetLoad("x".into()),
            RenderError::RenderEngine("x".into()),
            RenderError::CacheWrite("x".into()),
            RenderError::Internal("x".into()),
        ];
        for err in errors {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                response.headers()[header::CONTENT_TYPE],
                "text/plain; charset=utf-8"
            );
        }
    }

    #[test]
    fn test_error_display() {
        let err = RenderError::AssetLoad("template.html: not found".into());
        assert_eq!(err.to_string(), "Asset unavailable: template.html: not found");
    }
}
