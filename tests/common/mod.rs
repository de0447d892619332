#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::{Request, Response, header},
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use shopsite::app;
use shopsite::state::AppState;
use shopsite::throttle::Throttle;

const BOUNDARY: &str = "shopsite-test-boundary";

pub fn test_app(min_interval: Duration) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        Throttle::new(min_interval, Duration::from_secs(60)),
        1024 * 1024,
    ));
    (app(state.clone()), state)
}

// App whose throttle never rejects
pub fn unthrottled_app() -> (Router, Arc<AppState>) {
    test_app(Duration::ZERO)
}

pub fn from_address(mut request: Request<Body>, ip: [u8; 4]) -> Request<Body> {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 40000))));
    request
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn upload(uri: &str, file_name: &str, contents: &str) -> Request<Body> {
    let payload = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"upload_file\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {contents}\r\n\
         --{BOUNDARY}--\r\n"
    );
    multipart_request(uri, payload)
}

pub fn multipart_request(uri: &str, payload: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(payload))
        .unwrap()
}

pub fn boundary() -> &'static str {
    BOUNDARY
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
