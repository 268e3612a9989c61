//! Integration Tests for the Render Endpoint
//!
//! Drives the full router with a stand-in render engine and a local upstream
//! server for covers and lyrics, so both rendering and network traffic can be
//! counted.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use parking_lot::Mutex;
use serde_json::Value;
use songshot::{
    api::create_router,
    cache::CacheKey,
    error::Result,
    models::RenderParams,
    render::RenderEngine,
    AppState, CacheEvictor, Config, RenderService,
};
use tempfile::TempDir;
use tower::ServiceExt;

// == Helpers ==

/// Render engine that records the markup and returns a marker PNG
#[derive(Default)]
struct RecordingEngine {
    pages: Mutex<Vec<String>>,
}

impl RecordingEngine {
    fn calls(&self) -> usize {
        self.pages.lock().len()
    }

    fn last_page(&self) -> String {
        self.pages.lock().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl RenderEngine for RecordingEngine {
    async fn render(&self, html: &str) -> Result<Vec<u8>> {
        let n = {
            let mut pages = self.pages.lock();
            pages.push(html.to_string());
            pages.len()
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(format!("\u{89}PNG render #{}", n).into_bytes())
    }
}

/// Counts every request the upstream host receives
#[derive(Clone, Default)]
struct Upstream {
    hits: Arc<AtomicUsize>,
}

async fn cover(State(up): State<Upstream>) -> impl IntoResponse {
    up.hits.fetch_add(1, Ordering::SeqCst);
    ([(header::CONTENT_TYPE, "image/jpeg")], vec![0xFFu8, 0xD8, 0xFF])
}

async fn lyrics(State(up): State<Upstream>) -> impl IntoResponse {
    up.hits.fetch_add(1, Ordering::SeqCst);
    "[00:01.00]Hello <world>\n[00:02.500]Second & last"
}

async fn missing(State(up): State<Upstream>) -> impl IntoResponse {
    up.hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::NOT_FOUND, "not here")
}

async fn spawn_upstream() -> (SocketAddr, Upstream) {
    let upstream = Upstream::default();
    let app = Router::new()
        .route("/cover.jpg", get(cover))
        .route("/lyrics.lrc", get(lyrics))
        .route("/missing", get(missing))
        .with_state(upstream.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, upstream)
}

struct TestApp {
    dir: TempDir,
    config: Config,
    engine: Arc<RecordingEngine>,
    router: Router,
}

fn create_test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("template.html"),
        "<html><head>[Music::FONT_FACE]</head><body><img src=\"[Music::IMAGE]\">\
         <h1>[Music::TITLE]</h1><h2>[Music::ARTIST]</h2><p>[Music::LYRICS]</p></body></html>",
    )
    .unwrap();
    std::fs::write(dir.path().join("font.ttf"), b"ttf").unwrap();
    std::fs::create_dir(dir.path().join("cache")).unwrap();

    let config = Config {
        cache_dir: dir.path().join("cache"),
        template_path: dir.path().join("template.html"),
        font_path: dir.path().join("font.ttf"),
        fetch_timeout: 5,
        ..Config::default()
    };
    let engine = Arc::new(RecordingEngine::default());
    let service = RenderService::with_engine(&config, engine.clone()).unwrap();
    let router = create_router(AppState::new(service));

    TestApp {
        dir,
        config,
        engine,
        router,
    }
}

async fn get_uri(app: &Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, content_type, body)
}

fn card_uri(addr: SocketAddr) -> String {
    format!(
        "/?title=Test%20Title&artist=Test%20Artist&cover=http%3A%2F%2F{}%2Fcover.jpg",
        addr
    )
}

// == End-to-end ==

#[tokio::test]
async fn test_render_then_serve_from_cache() {
    let (addr, upstream) = spawn_upstream().await;
    let app = create_test_app();
    let uri = card_uri(addr);

    let (status, content_type, first) = get_uri(&app.router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert!(!first.is_empty());
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);

    let (status, _, second) = get_uri(&app.router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
    assert_eq!(app.engine.calls(), 1);
}

#[tokio::test]
async fn test_markup_contains_substituted_values() {
    let (addr, _) = spawn_upstream().await;
    let app = create_test_app();

    let (status, _, _) = get_uri(&app.router, &card_uri(addr)).await;
    assert_eq!(status, StatusCode::OK);

    let page = app.engine.last_page();
    assert!(page.contains("<h1>Test Title</h1>"));
    assert!(page.contains("<h2>Test Artist</h2>"));
    assert!(page.contains("<img src=\"data:image/jpeg;base64,/9j/\">"));
    assert!(page.contains("data:font/ttf;base64,dHRm"));
    assert!(page.contains(
        "<p>Line 1 of the lyrics<br>Line 2 of the lyrics<br>Line 3 of the lyrics</p>"
    ));
}

#[tokio::test]
async fn test_lyrics_are_fetched_and_sanitized() {
    let (addr, _) = spawn_upstream().await;
    let app = create_test_app();
    let uri = format!(
        "{}&lyrics=http%3A%2F%2F{}%2Flyrics.lrc",
        card_uri(addr),
        addr
    );

    let (status, _, _) = get_uri(&app.router, &uri).await;
    assert_eq!(status, StatusCode::OK);

    let page = app.engine.last_page();
    assert!(page.contains("<p>Hello &lt;world&gt;<br>Second &amp; last</p>"));
}

#[tokio::test]
async fn test_lyrics_fetch_failure_is_rendered_into_image() {
    let (addr, _) = spawn_upstream().await;
    let app = create_test_app();
    let uri = format!(
        "{}&lyrics_url=http%3A%2F%2F{}%2Fmissing",
        card_uri(addr),
        addr
    );

    let (status, content_type, body) = get_uri(&app.router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert!(!body.is_empty());
    assert!(app.engine.last_page().contains("Error fetching lyrics:"));
}

#[tokio::test]
async fn test_cover_failure_is_500_without_render() {
    let (addr, _) = spawn_upstream().await;
    let app = create_test_app();
    let uri = format!("/?title=T&cover=http%3A%2F%2F{}%2Fmissing", addr);

    let (status, content_type, body) = get_uri(&app.router, &uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert!(String::from_utf8(body).unwrap().contains("Cover unavailable"));
    assert_eq!(app.engine.calls(), 0);
}

#[tokio::test]
async fn test_missing_template_is_500() {
    let (addr, _) = spawn_upstream().await;
    let app = create_test_app();
    std::fs::remove_file(app.dir.path().join("template.html")).unwrap();

    let (status, _, body) = get_uri(&app.router, &card_uri(addr)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8(body).unwrap().contains("Asset unavailable"));
}

#[tokio::test]
async fn test_prepopulated_cache_is_served_without_network() {
    let (addr, upstream) = spawn_upstream().await;
    let app = create_test_app();

    let params = RenderParams::new(
        format!("http://{}/cover.jpg", addr),
        "Test Title",
        "Test Artist",
        None,
    );
    let key = CacheKey::derive(&params);
    std::fs::write(
        app.config.cache_dir.join(key.file_name()),
        b"previously rendered",
    )
    .unwrap();

    let (status, _, body) = get_uri(&app.router, &card_uri(addr)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"previously rendered");
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 0);
    assert_eq!(app.engine.calls(), 0);
}

#[tokio::test]
async fn test_concurrent_identical_requests_render_once() {
    let (addr, upstream) = spawn_upstream().await;
    let app = create_test_app();
    let uri = card_uri(addr);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let router = app.router.clone();
        let uri = uri.clone();
        handles.push(tokio::spawn(async move { get_uri(&router, &uri).await }));
    }

    let mut bodies = Vec::new();
    for handle in handles {
        let (status, _, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        bodies.push(body);
    }

    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(app.engine.calls(), 1);
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_evicted_entry_is_rendered_again() {
    let (addr, _) = spawn_upstream().await;
    let app = create_test_app();
    let uri = card_uri(addr);

    let (_, _, first) = get_uri(&app.router, &uri).await;

    // Age every cached file past a 60s TTL and sweep once
    for entry in std::fs::read_dir(&app.config.cache_dir).unwrap() {
        let path = entry.unwrap().path();
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(61))
            .unwrap();
    }
    let report = CacheEvictor::new(&app.config.cache_dir, Duration::from_secs(60))
        .sweep()
        .await
        .unwrap();
    assert_eq!(report.deleted, 1);

    let (status, _, second) = get_uri(&app.router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(first, second);
    assert_eq!(app.engine.calls(), 2);
}

// == Operational endpoints ==

#[tokio::test]
async fn test_stats_reflect_requests() {
    let (addr, _) = spawn_upstream().await;
    let app = create_test_app();
    let uri = card_uri(addr);

    get_uri(&app.router, &uri).await;
    get_uri(&app.router, &uri).await;

    let (status, _, body) = get_uri(&app.router, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["renders"], 1);
    assert_eq!(json["cached_files"], 1);
    assert!((json["hit_rate"].as_f64().unwrap() - 0.5).abs() < 0.001);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, _, body) = get_uri(&app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
