//! Rendering Engine
//!
//! Rasterizes finished markup into a PNG. The production engine drives a
//! headless browser over the DevTools protocol; tests substitute their own
//! implementation.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{RenderError, Result};

/// Turns HTML into PNG bytes.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>>;
}

fn engine_error(context: &str, e: impl std::fmt::Display) -> RenderError {
    RenderError::RenderEngine(format!("{}: {}", context, e))
}

/// PNG of the entire document, not just the visible viewport.
fn screenshot_params() -> ScreenshotParams {
    ScreenshotParams::builder().full_page(true).build()
}

// == Headless Browser ==
/// Launches a fresh headless browser for every screenshot and captures the
/// whole page, however far the content scrolls past the viewport.
#[derive(Debug, Clone)]
pub struct HeadlessBrowser {
    binary: String,
    timeout: Duration,
    width: u32,
    height: u32,
}

impl HeadlessBrowser {
    pub fn new(binary: impl Into<String>, timeout: Duration, width: u32, height: u32) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            width,
            height,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.browser_bin.clone(),
            Duration::from_secs(config.render_timeout),
            config.window_width,
            config.window_height,
        )
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
            ..Viewport::default()
        }
    }

    fn browser_config(&self, profile: &Path) -> Result<BrowserConfig> {
        BrowserConfig::builder()
            .chrome_executable(&self.binary)
            .user_data_dir(profile)
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--hide-scrollbars")
            .window_size(self.width, self.height)
            .viewport(self.viewport())
            .launch_timeout(self.timeout)
            .build()
            .map_err(|e| engine_error("browser config", e))
    }

    /// One browser session: launch, load the page, full-page screenshot,
    /// close.
    async fn capture(&self, page_path: &Path, profile: &Path) -> Result<Vec<u8>> {
        let (mut browser, mut handler) = Browser::launch(self.browser_config(profile)?)
            .await
            .map_err(|e| engine_error(&format!("launching {}", self.binary), e))?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let shot = async {
            let page = browser
                .new_page(format!("file://{}", page_path.display()))
                .await
                .map_err(|e| engine_error("loading page", e))?;
            page.screenshot(screenshot_params())
                .await
                .map_err(|e| engine_error("taking screenshot", e))
        }
        .await;

        if let Err(e) = browser.close().await {
            warn!("Error closing browser: {}", e);
        }
        if let Err(e) = browser.wait().await {
            warn!("Error waiting for browser exit: {}", e);
        }
        events.abort();

        shot
    }
}

#[async_trait]
impl RenderEngine for HeadlessBrowser {
    async fn render(&self, html: &str) -> Result<Vec<u8>> {
        let workdir =
            tempfile::TempDir::new().map_err(|e| engine_error("creating work dir", e))?;
        let page = workdir.path().join("page.html");
        let profile = workdir.path().join("profile");

        tokio::fs::write(&page, html)
            .await
            .map_err(|e| engine_error("writing page", e))?;

        debug!("Launching {} for {}", self.binary, page.display());
        let png = tokio::time::timeout(self.timeout, self.capture(&page, &profile))
            .await
            .map_err(|_| {
                RenderError::RenderEngine(format!(
                    "screenshot timed out after {}s",
                    self.timeout.as_secs()
                ))
            })??;

        if png.is_empty() {
            return Err(RenderError::RenderEngine("empty screenshot".to_string()));
        }
        Ok(png)
    }
}
