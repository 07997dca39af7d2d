#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use breeze_server::{build_router, config::Config, state::AppState};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tower::ServiceExt;

pub struct MockUpstream {
    pub status: StatusCode,
    pub body: &'static str,
    pub delay: Duration,
    pub hits: AtomicUsize,
    pub last_query: Mutex<Option<String>>,
}

impl MockUpstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn mock_handler(State(mock): State<Arc<MockUpstream>>, uri: Uri) -> Response {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    *mock.last_query.lock() = uri.query().map(ToString::to_string);
    if !mock.delay.is_zero() {
        tokio::time::sleep(mock.delay).await;
    }
    (
        mock.status,
        [("content-type", "application/json")],
        mock.body,
    )
        .into_response()
}

/// Serves a canned pollen response on an ephemeral port and returns its base
/// URL.
pub async fn spawn_upstream(
    status: StatusCode,
    body: &'static str,
    delay: Duration,
) -> (String, Arc<MockUpstream>) {
    let mock = Arc::new(MockUpstream {
        status,
        body,
        delay,
        hits: AtomicUsize::new(0),
        last_query: Mutex::new(None),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let app = Router::new().fallback(mock_handler).with_state(mock.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://127.0.0.1:{port}/v1"), mock)
}

pub fn test_config(pollen_api_base: &str, api_key: Option<&str>) -> Config {
    Config {
        pollen_api_key: api_key.map(ToString::to_string),
        pollen_api_base: pollen_api_base.to_string(),
        upstream_timeout: Duration::from_secs(2),
        ..Config::default()
    }
}

pub fn test_app(config: Config) -> Router {
    build_router(AppState::new(config).unwrap())
}

pub fn request(method: &str, uri: &str, client: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", client)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
