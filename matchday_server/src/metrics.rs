//! Prometheus metrics for monitoring the roster service.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener
//! (`METRICS_BIND`). Without an installed exporter every recording call is a
//! no-op, so handlers record unconditionally.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts, duration, status codes
//! - **Roster Metrics**: Registrations, membership toggles, status advances, teams
//! - **Auth Metrics**: Account creation, login attempts
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use matchday_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/events/{event_id}/join", 200);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Roster Metrics
// ============================================================================

/// Count players newly registered to tournaments. Re-registrations are not counted.
pub fn tournament_registrations_total(count: usize) {
    metrics::counter!("tournament_registrations_total").increment(count as u64);
}

/// Count event membership toggles, by origin (`admin` or `self`).
pub fn event_toggles_total(origin: &'static str, count: usize) {
    metrics::counter!("event_toggles_total", "origin" => origin).increment(count as u64);
}

/// Count status advances, labelled with the resulting status.
pub fn event_advances_total(status: &'static str) {
    metrics::counter!("event_advances_total", "status" => status).increment(1);
}

/// Count assembled teams.
pub fn teams_assembled_total(count: usize) {
    metrics::counter!("teams_assembled_total").increment(count as u64);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment created accounts counter.
pub fn accounts_created_total() {
    metrics::counter!("accounts_created_total").increment(1);
}

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}
