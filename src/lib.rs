//! Songshot - song card renderer
//!
//! Renders a song card (cover, title, artist, lyrics) from an HTML template
//! into a PNG with a headless browser, and caches the result on disk keyed by
//! the request parameters. A background evictor removes images older than
//! the configured TTL.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod render;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::RenderService;
pub use tasks::{CacheEvictor, EvictorHandle};
