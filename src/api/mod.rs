//! API Module
//!
//! HTTP handlers and routing for the render service.
//!
//! # Endpoints
//! - `GET /` - Song card PNG for `cover`, `title`, `artist`, `lyrics`/`lyrics_url`
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
