//! # Enrichment pipeline
//! Joins each raw Fulltrack alert to its resolved driver/vehicle identity
//! and projects the pair into the simplified output shape. Per-item
//! problems degrade to sentinel strings; only a failed listing aborts the
//! whole batch.

use metrics::{counter, gauge};
use serde::Serialize;

use crate::fulltrack::types::{AlertBatch, RawAlert};
use crate::identity::{IdentityResolver, NOT_INFORMED, VehicleIdentity};

/// Placeholder for a coordinate the alert did not carry.
pub const NOT_AVAILABLE: &str = "not available";
/// Placeholder link for coordinates that failed numeric parsing.
pub const INVALID_COORDINATES: &str = "invalid coordinates";

/// Output projection of one alert. Derived per request, never stored.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SimplifiedAlert {
    pub driver: String,
    pub vehicle: String,
    pub plate: String,
    pub latitude: String,
    pub longitude: String,
    pub maps_link: String,
    pub alert_time: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnrichmentResult {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub data: Vec<SimplifiedAlert>,
}

impl EnrichmentResult {
    fn empty(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            count: 0,
            data: Vec::new(),
        }
    }
}

/// Build a Google Maps link from the alert's coordinate strings.
///
/// Missing coordinates yield `"not available"`, unparseable ones
/// `"invalid coordinates"`. The link is templated from the parsed numbers,
/// not the original strings.
pub fn maps_link(latitude: &str, longitude: &str) -> String {
    if latitude.is_empty() || longitude.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    match (
        latitude.trim().parse::<f64>(),
        longitude.trim().parse::<f64>(),
    ) {
        (Ok(lat), Ok(lng)) => format!("https://www.google.com/maps?q={lat},{lng}"),
        _ => INVALID_COORDINATES.to_string(),
    }
}

/// Enrich one alert batch, in input order, one identity resolution at a
/// time. May populate the identity cache as a side effect: at most one
/// upstream detail call per distinct unseen vehicle id.
pub async fn enrich(resolver: &IdentityResolver, batch: &AlertBatch) -> EnrichmentResult {
    crate::metrics::ensure_described();

    if !batch.status || batch.data.is_empty() {
        return EnrichmentResult::empty("no alerts found");
    }

    let mut simplified = Vec::with_capacity(batch.data.len());
    for alert in &batch.data {
        simplified.push(simplify(resolver, alert).await);
    }

    counter!("enrich_runs_total").increment(1);
    counter!("enrich_alerts_total").increment(simplified.len() as u64);
    gauge!("enrich_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    EnrichmentResult {
        success: true,
        message: format!("{} alerts processed successfully", simplified.len()),
        count: simplified.len(),
        data: simplified,
    }
}

async fn simplify(resolver: &IdentityResolver, alert: &RawAlert) -> SimplifiedAlert {
    let identity = match alert.vehicle_id() {
        Some(id) => resolver.resolve(id).await,
        // Missing or uncoercible reference: degrade without an upstream call.
        None => VehicleIdentity::not_informed(),
    };

    let latitude = alert.ras_eal_latitude.as_deref().unwrap_or("");
    let longitude = alert.ras_eal_longitude.as_deref().unwrap_or("");
    let link = maps_link(latitude, longitude);

    SimplifiedAlert {
        driver: identity.driver_name,
        vehicle: identity.vehicle_name,
        plate: identity.vehicle_plate,
        latitude: coordinate_or_placeholder(latitude),
        longitude: coordinate_or_placeholder(longitude),
        maps_link: link,
        alert_time: alert
            .ras_eal_data_alerta
            .clone()
            .unwrap_or_else(|| NOT_INFORMED.to_string()),
    }
}

fn coordinate_or_placeholder(coord: &str) -> String {
    if coord.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        coord.to_string()
    }
}
