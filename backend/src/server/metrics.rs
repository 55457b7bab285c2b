//! Optional Prometheus metrics middleware construction.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};

/// Build the Prometheus middleware exposing `/metrics`.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the registry rejects the default metric
/// families, which only happens if they were already registered.
pub(crate) fn make_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("rewards")
        .endpoint("/metrics")
        .build()
        .map_err(|err| std::io::Error::other(format!("metrics middleware failed: {err}")))
}
