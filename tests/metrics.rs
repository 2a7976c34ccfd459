// tests/metrics.rs
//
// Prometheus exposition after driving traffic through the API in-process.
// The recorder can only be installed once per process, so this stays a
// single test covering presence and hit/miss movement together.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{self, Body};
use axum::http::Request;
use axum::Router;
use http::StatusCode;
use serde_json::json;
use tower::ServiceExt as _;

use fulltrack_alerts::api::{self, AppState};
use fulltrack_alerts::fulltrack::{AlertBatch, EventDetail, TelemetryApi, UpstreamError};
use fulltrack_alerts::identity::IdentityCache;
use fulltrack_alerts::metrics::Metrics;

struct CannedTelemetry {
    batch: AlertBatch,
}

#[async_trait]
impl TelemetryApi for CannedTelemetry {
    async fn list_alerts(&self) -> AlertBatch {
        self.batch.clone()
    }

    async fn fetch_event_detail(
        &self,
        _vehicle_id: i64,
    ) -> Result<Option<EventDetail>, UpstreamError> {
        Ok(Some(EventDetail {
            ras_mot_nome: Some("Ana".to_string()),
            ras_vei_veiculo: Some("Truck 9".to_string()),
            ras_vei_placa: Some("ABC1D23".to_string()),
        }))
    }
}

/// Same wiring as the binary: API routes merged with the /metrics route.
fn build_app() -> Router {
    let metrics = Metrics::init();
    let batch: AlertBatch = serde_json::from_value(json!({
        "status": true,
        "data": [ { "ras_eal_id_veiculo": 42 } ]
    }))
    .expect("test batch decodes");
    let state = AppState::new(
        Arc::new(CannedTelemetry { batch }),
        Arc::new(IdentityCache::new()),
    );
    api::create_router(state).merge(metrics.router())
}

#[tokio::test]
async fn metrics_exposition_tracks_pipeline_series() {
    let app = build_app();

    // Two enrichment runs over the same vehicle: the first resolution is a
    // miss, the second a hit. Same process, so the counters persist.
    for _ in 0..2 {
        let resp = app
            .clone()
            .oneshot(Request::get("/alerts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    for needle in [
        "enrich_runs_total",
        "enrich_alerts_total",
        "identity_cache_misses_total",
        "identity_cache_hits_total",
        "identity_cache_entries",
        "enrich_last_run_ts",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}
