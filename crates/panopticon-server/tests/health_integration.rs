use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use panopticon_core::config::Config;
use panopticon_core::error::PersistError;
use panopticon_core::report::StatsReport;
use panopticon_core::sparse::Placeholder;
use panopticon_core::store::StatsStore;
use panopticon_duckdb::DuckDbBackend;
use panopticon_server::app::build_app;
use panopticon_server::state::AppState;

struct UnreachableStore;

#[async_trait]
impl StatsStore for UnreachableStore {
    async fn insert_report(&self, _report: &StatsReport) -> Result<(), PersistError> {
        Err(PersistError::Store(anyhow::anyhow!("connection refused")))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

// ============================================================
// BDD: Health check returns 200 when DB is reachable
// ============================================================
#[tokio::test]
async fn test_health_returns_200_when_db_reachable() {
    let db = DuckDbBackend::open_in_memory(Placeholder::Numbered).expect("in-memory DuckDB");
    let state = Arc::new(AppState::new(Arc::new(db), Config::default()));
    let app = build_app(state);

    let response = app.oneshot(get("/health")).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

// ============================================================
// BDD: Health check returns 503 when the store is down
// ============================================================
#[tokio::test]
async fn test_health_returns_503_when_store_unreachable() {
    let state = Arc::new(AppState::new(Arc::new(UnreachableStore), Config::default()));
    let app = build_app(state);

    let response = app.oneshot(get("/health")).await.expect("request");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = json_body(response).await;
    assert_eq!(json["status"], "degraded");
}

// ============================================================
// BDD: /test answers plain "ok"
// ============================================================
#[tokio::test]
async fn test_test_endpoint_returns_ok_text() {
    let state = Arc::new(AppState::new(Arc::new(UnreachableStore), Config::default()));
    let app = build_app(state);

    let response = app.oneshot(get("/test")).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    assert_eq!(&bytes[..], b"ok");
}
