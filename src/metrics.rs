use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metric registration (so series show up on /metrics).
pub(crate) fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "upstream_requests_total",
            "Requests issued to the Fulltrack API."
        );
        describe_counter!(
            "upstream_errors_total",
            "Fulltrack requests that failed in transport or status."
        );
        describe_counter!(
            "identity_cache_hits_total",
            "Identity resolutions served from the cache."
        );
        describe_counter!(
            "identity_cache_misses_total",
            "Identity resolutions that went to the upstream."
        );
        describe_counter!("enrich_runs_total", "Enrichment pipeline invocations.");
        describe_counter!(
            "enrich_alerts_total",
            "Alerts projected into the simplified shape."
        );
        describe_gauge!(
            "identity_cache_entries",
            "Current number of cached vehicle identities."
        );
        describe_gauge!(
            "enrich_last_run_ts",
            "Unix ts when the enrichment pipeline last ran."
        );
        describe_histogram!(
            "upstream_request_ms",
            "Fulltrack request latency in milliseconds."
        );
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder. Call once at startup.
    pub fn init() -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        ensure_described();

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
