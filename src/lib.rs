// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod enrich;
pub mod fulltrack;
pub mod identity;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::AppConfig;
pub use crate::enrich::{enrich, maps_link, EnrichmentResult, SimplifiedAlert};
pub use crate::fulltrack::{DynTelemetry, FulltrackClient, TelemetryApi, UpstreamError};
pub use crate::identity::{IdentityCache, IdentityResolver, VehicleIdentity};
