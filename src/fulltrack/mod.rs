// src/fulltrack/mod.rs
pub mod client;
pub mod types;

pub use client::FulltrackClient;
pub use types::{AlertBatch, EventDetail, RawAlert};

use std::sync::Arc;

use thiserror::Error;

/// Failure of a single upstream request. The listing path absorbs these into
/// a `status: false` batch; the detail path surfaces them so the resolver
/// can cache the distinct error sentinel.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected upstream status {0}")]
    Status(reqwest::StatusCode),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(err)
        } else {
            UpstreamError::Transport(err)
        }
    }
}

/// Read surface of the Fulltrack API, kept behind a trait so the pipeline
/// and router can be exercised against scripted implementations.
#[async_trait::async_trait]
pub trait TelemetryApi: Send + Sync {
    /// Fetch all open alerts. Never fails: any transport or status problem
    /// comes back as a `status: false` batch carrying the error text, and
    /// callers check the flag.
    async fn list_alerts(&self) -> AlertBatch;

    /// Fetch the event record for one vehicle id. `Ok(None)` when the
    /// upstream answered but reported no data; `Err` only on transport or
    /// status failure.
    async fn fetch_event_detail(
        &self,
        vehicle_id: i64,
    ) -> Result<Option<EventDetail>, UpstreamError>;
}

pub type DynTelemetry = Arc<dyn TelemetryApi>;
