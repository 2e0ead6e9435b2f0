use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap},
    Json,
};
use serde_json::{json, Value};

use panopticon_core::{
    classify::classify, error::PersistError, ingest::ingest, report::Receipt,
};

use crate::{error::AppError, state::AppState};

/// `POST /push`: record one usage-statistics report.
///
/// ## Auth
/// None. Any homeserver may report.
///
/// ## Service-assigned fields
/// `local_timestamp`, `remote_addr` (the TCP peer), `forwarded_for` and
/// `user_agent` are taken from the connection and headers. Same-named keys in
/// the body are ignored. Header bytes that are not valid UTF-8 are replaced,
/// never dropped.
///
/// ## Classification
/// A `User-Agent` starting with `Dendrite` files the report under
/// `dendrite_stats`; everything else goes to `stats`.
///
/// ## Response
/// `200` with `{}`. Decode failures return `400`, store failures `500`, both
/// with `{"error_message": "unable to process request"}`.
#[tracing::instrument(skip_all)]
pub async fn push(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let forwarded_for = header_text(&headers, "x-forwarded-for");
    let user_agent = header_text(&headers, header::USER_AGENT.as_str());
    let kind = classify(user_agent.as_deref());
    let receipt = Receipt::now(peer.to_string(), forwarded_for.as_deref(), user_agent.as_deref());

    tokio::time::timeout(
        state.config.persist_timeout(),
        ingest(state.store.as_ref(), &body, receipt),
    )
    .await
    .map_err(|_| AppError::Persist {
        kind,
        source: PersistError::TimedOut(state.config.persist_timeout_ms),
    })?
    .map_err(|e| AppError::from_ingest(kind, e))?;

    tracing::debug!(kind = %kind, "Report stored");
    Ok(Json(json!({})))
}

/// Raw header value as text. Non-ASCII bytes survive as UTF-8 (or replacement
/// characters), so a prefix check still sees the leading product token.
fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
}
