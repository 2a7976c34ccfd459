use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::enrich::{self, EnrichmentResult};
use crate::fulltrack::{AlertBatch, DynTelemetry};
use crate::identity::{CacheStats, IdentityCache, IdentityResolver};

pub const SERVICE_NAME: &str = "fulltrack-alerts-api";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub struct AppState {
    pub telemetry: DynTelemetry,
    pub cache: Arc<IdentityCache>,
    pub resolver: Arc<IdentityResolver>,
}

impl AppState {
    /// Wire the shared state: the resolver joins the given telemetry client
    /// and cache, so every route sees the same entries.
    pub fn new(telemetry: DynTelemetry, cache: Arc<IdentityCache>) -> Self {
        let resolver = Arc::new(IdentityResolver::new(telemetry.clone(), cache.clone()));
        Self {
            telemetry,
            cache,
            resolver,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/alerts", get(enriched_alerts))
        .route("/alerts/raw", get(raw_alerts))
        .route("/alerts/vehicle/{vehicle_id}", get(vehicle_identity))
        .route("/cache/clear", post(clear_cache))
        .route("/cache/stats", get(cache_stats))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct ErrorResp {
    success: bool,
    message: String,
}

type UpstreamFailure = (StatusCode, Json<ErrorResp>);

/// The listing call is the only upstream failure surfaced to callers; it
/// comes back as 502 with the upstream's own error text.
fn upstream_failure(batch: &AlertBatch) -> UpstreamFailure {
    let message = batch
        .message
        .clone()
        .unwrap_or_else(|| "alert listing failed".to_string());
    tracing::warn!(%message, "upstream alert listing failed");
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResp {
            success: false,
            message,
        }),
    )
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": format!("Fulltrack Alerts API v{SERVICE_VERSION}"),
        "version": SERVICE_VERSION,
        "endpoints": {
            "/alerts": "enriched alerts (driver, vehicle, plate, coordinates, map link, time)",
            "/alerts/raw": "alerts exactly as Fulltrack returns them",
            "/alerts/vehicle/{id}": "driver/vehicle identity for one vehicle id",
            "/cache/clear": "drop all cached vehicle identities (POST)",
            "/cache/stats": "cached entry count and approximate size",
            "/health": "service liveness",
        },
        "returned_fields": [
            "driver",
            "vehicle",
            "plate",
            "latitude",
            "longitude",
            "maps_link",
            "alert_time",
        ],
    }))
}

#[derive(serde::Serialize)]
struct HealthResp {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResp> {
    Json(HealthResp {
        status: "healthy",
        service: SERVICE_NAME,
        version: SERVICE_VERSION,
    })
}

async fn enriched_alerts(
    State(state): State<AppState>,
) -> Result<Json<EnrichmentResult>, UpstreamFailure> {
    let batch = state.telemetry.list_alerts().await;
    if !batch.status {
        return Err(upstream_failure(&batch));
    }
    let result = enrich::enrich(&state.resolver, &batch).await;
    Ok(Json(result))
}

async fn raw_alerts(State(state): State<AppState>) -> Result<Json<AlertBatch>, UpstreamFailure> {
    let batch = state.telemetry.list_alerts().await;
    if !batch.status {
        return Err(upstream_failure(&batch));
    }
    Ok(Json(batch))
}

#[derive(serde::Serialize)]
struct VehicleResp {
    vehicle_id: i64,
    driver_name: String,
    vehicle_name: String,
    vehicle_plate: String,
}

async fn vehicle_identity(
    State(state): State<AppState>,
    Path(vehicle_id): Path<i64>,
) -> Json<VehicleResp> {
    let identity = state.resolver.resolve(vehicle_id).await;
    Json(VehicleResp {
        vehicle_id,
        driver_name: identity.driver_name,
        vehicle_name: identity.vehicle_name,
        vehicle_plate: identity.vehicle_plate,
    })
}

#[derive(serde::Serialize)]
struct ClearResp {
    success: bool,
    message: &'static str,
}

async fn clear_cache(State(state): State<AppState>) -> Json<ClearResp> {
    state.cache.clear();
    tracing::info!("identity cache cleared");
    Json(ClearResp {
        success: true,
        message: "cache cleared",
    })
}

async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}
