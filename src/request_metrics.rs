use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::metrics;

/// Request accounting middleware
/// Records count and latency per route template, so `/readings/read/:smart_meter_id`
/// is one series regardless of the meter id
pub async fn track_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16();
    metrics::record_request(&endpoint, status);
    metrics::record_duration(&endpoint, start.elapsed());

    tracing::debug!(
        endpoint = %endpoint,
        status,
        duration_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
