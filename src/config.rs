//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum age in seconds of a cached image before eviction
    pub cache_ttl: u64,
    /// Directory holding rendered images
    pub cache_dir: PathBuf,
    /// HTTP bind host
    pub server_host: String,
    /// HTTP server port
    pub server_port: u16,
    /// Number of runtime worker threads serving requests
    pub worker_threads: usize,
    /// HTML template with the `[Music::*]` placeholders
    pub template_path: PathBuf,
    /// Font embedded into every rendered page
    pub font_path: PathBuf,
    /// Headless browser executable
    pub browser_bin: String,
    /// Upper bound in seconds for a single browser screenshot
    pub render_timeout: u64,
    /// Upper bound in seconds for a single lyrics/cover download
    pub fetch_timeout: u64,
    /// Browser viewport width in pixels
    pub window_width: u32,
    /// Browser viewport height in pixels
    pub window_height: u32,
    /// Lyrics lines kept before truncation
    pub max_lyrics_lines: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL` - Cache entry lifetime in seconds (default: 3600)
    /// - `CACHE_DIR` - Cache root directory (default: `cache`)
    /// - `SERVER_HOST` / `SERVER_PORT` - Bind address (default: 0.0.0.0:3006)
    /// - `WORKER_THREADS` - Runtime worker threads (default: 4)
    /// - `TEMPLATE_PATH` - HTML template (default: `template.html`)
    /// - `FONT_PATH` - Embedded font file
    /// - `BROWSER_BIN` - Headless browser binary (default: `chromium`)
    /// - `RENDER_TIMEOUT` / `FETCH_TIMEOUT` - Timeouts in seconds (default: 120 / 30)
    /// - `WINDOW_WIDTH` / `WINDOW_HEIGHT` - Viewport (default: 1200x675)
    /// - `MAX_LYRICS_LINES` - Lyrics truncation limit (default: 150)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_ttl: env_or("CACHE_TTL", defaults.cache_ttl),
            cache_dir: env_or("CACHE_DIR", defaults.cache_dir),
            server_host: env_or("SERVER_HOST", defaults.server_host),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            worker_threads: env_or("WORKER_THREADS", defaults.worker_threads),
            template_path: env_or("TEMPLATE_PATH", defaults.template_path),
            font_path: env_or("FONT_PATH", defaults.font_path),
            browser_bin: env_or("BROWSER_BIN", defaults.browser_bin),
            render_timeout: env_or("RENDER_TIMEOUT", defaults.render_timeout),
            fetch_timeout: env_or("FETCH_TIMEOUT", defaults.fetch_timeout),
            window_width: env_or("WINDOW_WIDTH", defaults.window_width),
            window_height: env_or("WINDOW_HEIGHT", defaults.window_height),
            max_lyrics_lines: env_or("MAX_LYRICS_LINES", defaults.max_lyrics_lines),
        }
    }

    /// Cache TTL as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// `host:port` string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl: 3600,
            cache_dir: PathBuf::from("cache"),
            server_host: "0.0.0.0".to_string(),
            server_port: 3006,
            worker_threads: 4,
            template_path: PathBuf::from("template.html"),
            font_path: PathBuf::from("fonts/HanYiWenHei/HYWenHei-65W-3.ttf"),
            browser_bin: "chromium".to_string(),
            render_timeout: 120,
            fetch_timeout: 30,
            window_width: 1200,
            window_height: 675,
            max_lyrics_lines: 150,
        }
    }
}

/// Reads and parses an environment variable, falling back to `default`
/// when it is unset or does not parse.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
