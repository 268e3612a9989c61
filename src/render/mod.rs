//! Render Module
//!
//! Builds the song card markup and rasterizes it.

pub mod engine;
mod pipeline;
pub mod template;

pub use engine::{HeadlessBrowser, RenderEngine};
pub use pipeline::RenderPipeline;
