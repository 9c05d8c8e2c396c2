#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::Path as UrlPath;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get as get_route;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use scenegen_api::config::ServerConfig;
use scenegen_api::reconcile::Reconciler;
use scenegen_api::router::build_app_router;
use scenegen_api::state::AppState;
use scenegen_client::fetch::ImageFetcher;
use scenegen_core::correlator::TaskIndex;

/// Build a test `ServerConfig` over `data_dir`, resolving scheme-less image
/// URLs against `asset_origin`.
pub fn test_config(data_dir: &Path, asset_origin: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        data_dir: data_dir.to_path_buf(),
        asset_origin: asset_origin.to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        fetch_timeout_secs: 5,
    }
}

/// Build the full application router with all middleware layers over
/// `data_dir`.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack. The task index starts empty; lookups fall
/// back to scanning the data root.
pub fn build_test_app(data_dir: &Path, asset_origin: &str) -> Router {
    let config = test_config(data_dir, asset_origin);
    let index = Arc::new(TaskIndex::new(data_dir));
    let fetcher = ImageFetcher::new(
        asset_origin.to_string(),
        Duration::from_secs(config.fetch_timeout_secs),
    )
    .unwrap();

    let state = AppState {
        config: Arc::new(config.clone()),
        reconciler: Arc::new(Reconciler::new(index, fetcher)),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    post_raw(app, uri, "application/json", body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, content_type: &str, body: String) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Data root fixtures
// ---------------------------------------------------------------------------

/// Create `<root>/<batch>/<task_id>/desc.txt` with the given record text.
pub fn seed_task(root: &Path, batch: &str, task_id: &str, desc: &str) -> std::path::PathBuf {
    let dir = root.join(batch).join(task_id);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("desc.txt"), desc).unwrap();
    dir
}

/// Directory entries of `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ---------------------------------------------------------------------------
// Asset host
// ---------------------------------------------------------------------------

/// Body served for every asset: `image:<path>`.
pub fn asset_body(path: &str) -> Vec<u8> {
    format!("image:{path}").into_bytes()
}

async fn serve_asset(UrlPath(path): UrlPath<String>) -> impl IntoResponse {
    if path.starts_with("missing") {
        return StatusCode::NOT_FOUND.into_response();
    }
    asset_body(&path).into_response()
}

/// Start a local stand-in for the remote image host. Any path starting with
/// `missing` answers 404; everything else answers 200 with
/// [`asset_body`]. Returns the origin, e.g. `http://127.0.0.1:12345/`.
pub async fn spawn_asset_server() -> String {
    let app = Router::new().route("/{*path}", get_route(serve_asset));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}
