//! Metrics and observability utilities
//!
//! Counters and histograms are recorded through the `metrics` facade; the
//! gateway installs the Prometheus recorder and renders it on `/metrics`.

use crate::errors::{AppError, Result};
use crate::scraper::ScrapeSummary;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Metrics prefix for all NewsNotes metrics
pub const METRICS_PREFIX: &str = "newsnotes";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s, slow scrapes
];

/// Install the global Prometheus recorder and describe every metric
pub fn install_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Suffix("duration_seconds".to_string()), LATENCY_BUCKETS)
        .and_then(|builder| builder.install_recorder())
        .map_err(|e| AppError::Configuration {
            message: format!("Failed to install metrics recorder: {}", e),
        })?;

    register_metrics();
    Ok(handle)
}

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Scrape metrics
    describe_counter!(
        format!("{}_scrapes_total", METRICS_PREFIX),
        Unit::Count,
        "Completed homepage scrapes"
    );

    describe_counter!(
        format!("{}_scraped_articles_total", METRICS_PREFIX),
        Unit::Count,
        "Articles extracted by scrapes, labelled by store outcome"
    );

    describe_histogram!(
        format!("{}_scrape_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Fetch, extract and store latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record a finished scrape
pub fn record_scrape(duration_secs: f64, summary: &ScrapeSummary) {
    counter!(format!("{}_scrapes_total", METRICS_PREFIX)).increment(1);

    counter!(
        format!("{}_scraped_articles_total", METRICS_PREFIX),
        "outcome" => "stored"
    )
    .increment(summary.stored as u64);

    counter!(
        format!("{}_scraped_articles_total", METRICS_PREFIX),
        "outcome" => "failed"
    )
    .increment(summary.failed as u64);

    histogram!(format!("{}_scrape_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_helpers_without_recorder() {
        // No recorder installed: the facade drops everything
        let metrics = RequestMetrics::start("GET", "/articles");
        metrics.finish(200);
        record_scrape(0.2, &ScrapeSummary { found: 3, stored: 2, failed: 1 });
    }
}
