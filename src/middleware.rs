use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

use crate::metrics::{REQUEST_TOTAL, THROTTLED_TOTAL};
use crate::state::AppState;
use crate::throttle::Decision;

const THROTTLED_BODY: &str = "<!doctype html><title>429</title><p>Limit rate requests</p>";

/// Rejects requests from an address that arrive faster than the throttle's
/// minimum interval.
pub async fn throttle_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    REQUEST_TOTAL.inc();

    let address = client_address(&request);
    match state.throttle.check(&address) {
        Decision::Allowed => next.run(request).await,
        Decision::Rejected => {
            THROTTLED_TOTAL.inc();
            debug!(%address, path = %request.uri().path(), "request throttled");
            (StatusCode::TOO_MANY_REQUESTS, Html(THROTTLED_BODY)).into_response()
        }
    }
}

// Peer IP as seen by the transport; proxy headers are ignored
pub fn client_address(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
