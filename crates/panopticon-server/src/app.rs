use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// `/push` reads the peer address through `ConnectInfo`, so the router must be
/// served with `into_make_service_with_connect_info::<SocketAddr>()` (tests
/// layer `MockConnectInfo` instead).
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/test", get(routes::health::reachable))
        .route("/push", post(routes::push::push))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
