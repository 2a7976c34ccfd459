//! # Vehicle identity
//! Cache and resolver for the vehicle-id → {driver, vehicle, plate} join.
//!
//! Entries live for the process lifetime: no TTL, no eviction, cleared only
//! by the explicit cache-clear operation. A hit short-circuits the upstream
//! even when the cached value is a sentinel; errors are remembered, not
//! retried.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};

use crate::fulltrack::{DynTelemetry, EventDetail};

/// Placeholder for identity fields the upstream did not provide.
pub const NOT_INFORMED: &str = "not informed";
/// Placeholder for identity fields lost to a failed detail lookup.
pub const FETCH_ERROR: &str = "error fetching";

/// The {driver, vehicle, plate} triple associated with a vehicle id.
/// Immutable once cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VehicleIdentity {
    pub driver_name: String,
    pub vehicle_name: String,
    pub vehicle_plate: String,
}

impl VehicleIdentity {
    /// Triple for a missing vehicle reference or an upstream answer with no
    /// matching record.
    pub fn not_informed() -> Self {
        Self::uniform(NOT_INFORMED)
    }

    /// Triple for a detail lookup that failed in transport. Kept distinct
    /// from [`VehicleIdentity::not_informed`] so consumers can tell "no
    /// data" from "lookup failed".
    pub fn fetch_error() -> Self {
        Self::uniform(FETCH_ERROR)
    }

    pub fn from_event(detail: EventDetail) -> Self {
        Self {
            driver_name: detail
                .ras_mot_nome
                .unwrap_or_else(|| NOT_INFORMED.to_string()),
            vehicle_name: detail
                .ras_vei_veiculo
                .unwrap_or_else(|| NOT_INFORMED.to_string()),
            vehicle_plate: detail
                .ras_vei_placa
                .unwrap_or_else(|| NOT_INFORMED.to_string()),
        }
    }

    fn uniform(s: &str) -> Self {
        Self {
            driver_name: s.to_string(),
            vehicle_name: s.to_string(),
            vehicle_plate: s.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CacheStats {
    pub cached_vehicles: usize,
    pub cache_size_kb: f64,
}

/// Process-lifetime map from vehicle id to identity. Owned by the app state
/// and passed by reference into the resolver, never a global.
#[derive(Debug, Default)]
pub struct IdentityCache {
    inner: Mutex<HashMap<i64, VehicleIdentity>>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, vehicle_id: i64) -> Option<VehicleIdentity> {
        self.lock().get(&vehicle_id).cloned()
    }

    /// Unconditional overwrite-or-insert; the map never holds more than one
    /// entry per vehicle id.
    pub fn put(&self, vehicle_id: i64, identity: VehicleIdentity) {
        let mut map = self.lock();
        map.insert(vehicle_id, identity);
        gauge!("identity_cache_entries").set(map.len() as f64);
    }

    /// Drop every entry. In-flight resolutions are unaffected; one finishing
    /// after the clear re-inserts only its own id.
    pub fn clear(&self) {
        self.lock().clear();
        gauge!("identity_cache_entries").set(0.0);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry count plus the JSON-serialized size of the current entries in
    /// KiB. The size is a dashboard approximation, not a heap measurement.
    pub fn stats(&self) -> CacheStats {
        let snapshot = self.lock().clone();
        let bytes = serde_json::to_string(&snapshot)
            .map(|s| s.len())
            .unwrap_or(0);
        CacheStats {
            cached_vehicles: snapshot.len(),
            cache_size_kb: bytes as f64 / 1024.0,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, VehicleIdentity>> {
        self.inner.lock().expect("identity cache mutex poisoned")
    }
}

/// Join logic: resolve a vehicle id to its identity through the cache,
/// falling back to one upstream detail call per unseen id.
pub struct IdentityResolver {
    telemetry: DynTelemetry,
    cache: Arc<IdentityCache>,
    // Serializes the miss path so concurrent requests cannot race the same
    // id into duplicate upstream calls.
    flight: tokio::sync::Mutex<()>,
}

impl IdentityResolver {
    pub fn new(telemetry: DynTelemetry, cache: Arc<IdentityCache>) -> Self {
        Self {
            telemetry,
            cache,
            flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Resolve one vehicle id, consulting the cache first. Every outcome is
    /// cached (full identity, "no data" default, or the error sentinel), and
    /// a later hit never touches the upstream again until a cache clear.
    pub async fn resolve(&self, vehicle_id: i64) -> VehicleIdentity {
        if let Some(hit) = self.cache.get(vehicle_id) {
            counter!("identity_cache_hits_total").increment(1);
            return hit;
        }

        let _flight = self.flight.lock().await;
        // Re-check: another request may have resolved this id while we
        // waited for the lock.
        if let Some(hit) = self.cache.get(vehicle_id) {
            counter!("identity_cache_hits_total").increment(1);
            return hit;
        }
        counter!("identity_cache_misses_total").increment(1);

        let identity = match self.telemetry.fetch_event_detail(vehicle_id).await {
            Ok(Some(detail)) => VehicleIdentity::from_event(detail),
            Ok(None) => {
                tracing::debug!(vehicle_id, "no event detail for vehicle");
                VehicleIdentity::not_informed()
            }
            Err(e) => {
                tracing::warn!(error = ?e, vehicle_id, "event detail fetch failed");
                VehicleIdentity::fetch_error()
            }
        };
        self.cache.put(vehicle_id, identity.clone());
        identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(driver: &str) -> VehicleIdentity {
        VehicleIdentity {
            driver_name: driver.to_string(),
            vehicle_name: "Truck 9".to_string(),
            vehicle_plate: "ABC1D23".to_string(),
        }
    }

    #[test]
    fn put_keeps_one_entry_per_id() {
        let cache = IdentityCache::new();
        cache.put(7, identity("Ana"));
        cache.put(7, identity("Bruno"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(7).unwrap().driver_name, "Bruno");
    }

    #[test]
    fn clear_empties_the_map() {
        let cache = IdentityCache::new();
        cache.put(1, identity("Ana"));
        cache.put(2, identity("Bruno"));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn stats_reflect_entries_and_shrink_after_clear() {
        let cache = IdentityCache::new();
        let empty = cache.stats();
        assert_eq!(empty.cached_vehicles, 0);

        cache.put(1, identity("Ana"));
        let one = cache.stats();
        assert_eq!(one.cached_vehicles, 1);
        assert!(one.cache_size_kb > empty.cache_size_kb);

        cache.clear();
        assert_eq!(cache.stats().cached_vehicles, 0);
    }

    #[test]
    fn sentinel_triples_are_uniform_and_distinct() {
        let missing = VehicleIdentity::not_informed();
        assert_eq!(missing.driver_name, NOT_INFORMED);
        assert_eq!(missing.vehicle_name, NOT_INFORMED);
        assert_eq!(missing.vehicle_plate, NOT_INFORMED);

        let errored = VehicleIdentity::fetch_error();
        assert_eq!(errored.driver_name, FETCH_ERROR);
        assert_ne!(missing, errored);
    }

    #[test]
    fn from_event_defaults_each_field_individually() {
        let detail = EventDetail {
            ras_mot_nome: Some("J. Silva".to_string()),
            ..EventDetail::default()
        };
        let id = VehicleIdentity::from_event(detail);
        assert_eq!(id.driver_name, "J. Silva");
        assert_eq!(id.vehicle_name, NOT_INFORMED);
        assert_eq!(id.vehicle_plate, NOT_INFORMED);
    }
}
