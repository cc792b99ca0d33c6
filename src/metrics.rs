use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics exporter
///
/// Fails if a global recorder is already installed.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "joi_readings_stored_total",
        "Total number of electricity readings stored"
    );
    describe_counter!(
        "joi_requests_total",
        "Total number of HTTP API requests"
    );
    describe_histogram!(
        "joi_request_duration_seconds",
        "Request duration in seconds"
    );
    describe_counter!(
        "joi_peak_multipliers_total",
        "Total number of peak time multiplier submissions"
    );
    describe_gauge!(
        "joi_info",
        "Service version and build information"
    );

    gauge!("joi_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record readings appended for a meter
pub fn record_readings_stored(smart_meter_id: &str, count: usize) {
    counter!(
        "joi_readings_stored_total",
        "smart_meter_id" => smart_meter_id.to_string(),
    )
    .increment(count as u64);
}

/// Record a request
pub fn record_request(endpoint: &str, status: u16) {
    counter!(
        "joi_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
}

/// Record request duration
pub fn record_duration(endpoint: &str, duration: Duration) {
    histogram!(
        "joi_request_duration_seconds",
        "endpoint" => endpoint.to_string(),
    )
    .record(duration.as_secs_f64());
}

/// Record a peak multiplier submission
///
/// Only catalog plans get their own series; submissions for unknown plans
/// share one `applied="false"` series.
pub fn record_peak_multiplier(price_plan_id: Option<&str>) {
    match price_plan_id {
        Some(id) => counter!(
            "joi_peak_multipliers_total",
            "price_plan_id" => id.to_string(),
            "applied" => "true",
        )
        .increment(1),
        None => counter!("joi_peak_multipliers_total", "applied" => "false").increment(1),
    }
}
