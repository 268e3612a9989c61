//! Render Service
//!
//! Per-request orchestration: answer from the cache, otherwise fetch the
//! lyrics and cover, render, store and answer with the rendered bytes.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{CacheKey, CacheStats, CacheStore, InFlight, SharedImage};
use crate::config::Config;
use crate::error::{RenderError, Result};
use crate::fetch::{ContentFetcher, PLACEHOLDER_LYRICS};
use crate::models::RenderParams;
use crate::render::{HeadlessBrowser, RenderEngine, RenderPipeline};

// == Render Service ==
pub struct RenderService {
    store: CacheStore,
    fetcher: ContentFetcher,
    pipeline: RenderPipeline,
    inflight: InFlight,
    stats: RwLock<CacheStats>,
}

impl RenderService {
    pub fn new(store: CacheStore, fetcher: ContentFetcher, pipeline: RenderPipeline) -> Self {
        Self {
            store,
            fetcher,
            pipeline,
            inflight: InFlight::new(),
            stats: RwLock::new(CacheStats::new()),
        }
    }

    /// Wires the service from configuration with the given engine.
    pub fn with_engine(config: &Config, engine: Arc<dyn RenderEngine>) -> Result<Self> {
        let store = CacheStore::new(config.cache_dir.clone());
        let fetcher = ContentFetcher::from_config(config)?;
        let pipeline = RenderPipeline::new(
            engine,
            store.clone(),
            config.template_path.clone(),
            config.font_path.clone(),
        );
        Ok(Self::new(store, fetcher, pipeline))
    }

    /// Wires the service with the headless browser engine.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_engine(config, Arc::new(HeadlessBrowser::from_config(config)))
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    // == Get Or Render ==
    /// Returns the PNG for `params`, generating it on a cache miss.
    ///
    /// Concurrent misses for the same key share a single generation.
    pub async fn get_or_render(&self, params: &RenderParams) -> Result<Vec<u8>> {
        let key = CacheKey::derive(params);

        if let Some(bytes) = self.store.lookup(&key).await? {
            info!("Serving cached image: {}", self.store.path_for(&key).display());
            self.stats.write().await.record_hit();
            return Ok(bytes);
        }
        self.stats.write().await.record_miss();

        let flight = self
            .inflight
            .run(&key, || self.generate(&key, params))
            .await;
        if flight.coalesced {
            debug!("Joined in-flight render of {}", key);
            self.stats.write().await.record_coalesced();
        }

        // Served from the generation's own bytes, so a sweep that removes the
        // fresh entry cannot fail this request.
        flight.result.map(Arc::unwrap_or_clone)
    }

    /// Fetches content and renders one image into the cache.
    async fn generate(&self, key: &CacheKey, params: &RenderParams) -> Result<SharedImage> {
        // A generation that finished just before this one started
        if let Some(bytes) = self.store.lookup(key).await? {
            return Ok(Arc::new(bytes));
        }

        let lyrics = match params.lyrics_source.as_deref() {
            Some(url) => self.fetcher.fetch_lyrics(url).await,
            None => PLACEHOLDER_LYRICS.to_string(),
        };

        let Some(cover) = self.fetcher.fetch_cover_inline(&params.cover).await else {
            self.stats.write().await.record_render_failure();
            return Err(RenderError::CoverUnavailable(params.cover.clone()));
        };

        match self.pipeline.render(key, params, &lyrics, &cover).await {
            Ok(png) => {
                info!(
                    "Generated and cached image: {}",
                    self.store.path_for(key).display()
                );
                self.stats.write().await.record_render();
                Ok(Arc::new(png))
            }
            Err(e) => {
                self.stats.write().await.record_render_failure();
                Err(e)
            }
        }
    }
}
