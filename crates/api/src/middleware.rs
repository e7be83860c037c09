use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Run each request inside an `http.request` span tagged with a fresh
/// UUIDv7 request id, and echo that id back in `x-request-id`.
pub async fn request_tracing(req: Request, next: Next) -> Response {
    let request_id = Uuid::now_v7();
    let span = tracing::info_span!(
        "http.request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id,
    );

    let started = Instant::now();
    let mut res = next.run(req).instrument(span.clone()).await;

    span.in_scope(|| {
        tracing::info!(
            status = res.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}
