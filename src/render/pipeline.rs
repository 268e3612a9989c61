//! Render Pipeline
//!
//! Template + font + fetched content -> markup -> PNG -> cache entry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::error;

use crate::cache::{CacheKey, CacheStore};
use crate::error::{RenderError, Result};
use crate::fetch::InlineAsset;
use crate::models::RenderParams;
use crate::render::engine::RenderEngine;
use crate::render::template::{font_face_block, substitute, Placeholders};

/// MIME type of the embedded font
const FONT_MIME: &str = "font/ttf";

// == Render Pipeline ==
#[derive(Clone)]
pub struct RenderPipeline {
    engine: Arc<dyn RenderEngine>,
    store: CacheStore,
    template_path: PathBuf,
    font_path: PathBuf,
}

impl RenderPipeline {
    pub fn new(
        engine: Arc<dyn RenderEngine>,
        store: CacheStore,
        template_path: impl Into<PathBuf>,
        font_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            store,
            template_path: template_path.into(),
            font_path: font_path.into(),
        }
    }

    /// Renders one image, stores it under `key` and returns its bytes.
    ///
    /// Template and font are read from disk on every call. Every failure
    /// (asset I/O, engine, cache write) is logged and returned as a
    /// `RenderError`.
    pub async fn render(
        &self,
        key: &CacheKey,
        params: &RenderParams,
        lyrics: &str,
        cover: &InlineAsset,
    ) -> Result<Vec<u8>> {
        let result = self.render_inner(key, params, lyrics, cover).await;
        if let Err(e) = &result {
            error!("Error generating image {}: {}", key, e);
        }
        result
    }

    async fn render_inner(
        &self,
        key: &CacheKey,
        params: &RenderParams,
        lyrics: &str,
        cover: &InlineAsset,
    ) -> Result<Vec<u8>> {
        let markup = self.build_markup(params, lyrics, cover).await?;
        let png = self.engine.render(&markup).await?;
        self.store.store(key, &png).await?;
        Ok(png)
    }

    /// Loads the assets and fills in the template.
    pub async fn build_markup(
        &self,
        params: &RenderParams,
        lyrics: &str,
        cover: &InlineAsset,
    ) -> Result<String> {
        let template = read_asset(&self.template_path).await?;
        let template = String::from_utf8(template).map_err(|e| {
            RenderError::AssetLoad(format!("{}: {}", self.template_path.display(), e))
        })?;
        let font = InlineAsset::new(FONT_MIME, read_asset(&self.font_path).await?);

        let font_face = font_face_block(&font);
        let image = cover.data_uri();
        Ok(substitute(
            &template,
            &Placeholders {
                font_face: &font_face,
                image: &image,
                title: &params.title,
                artist: &params.artist,
                lyrics,
            },
        ))
    }
}

async fn read_asset(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| RenderError::AssetLoad(format!("{}: {}", path.display(), e)))
}
