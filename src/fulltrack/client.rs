// src/fulltrack/client.rs
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::de::DeserializeOwned;

use super::types::{AlertBatch, EventDetail, EventsResponse};
use super::{TelemetryApi, UpstreamError};

/// Request timeout for the full alert listing.
pub const LIST_ALERTS_TIMEOUT: Duration = Duration::from_secs(30);
/// Request timeout for a single event-detail lookup.
pub const EVENT_DETAIL_TIMEOUT: Duration = Duration::from_secs(10);

// Fulltrack rejects requests without a browser-looking agent string.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Production `TelemetryApi` over the Fulltrack HTTP API.
pub struct FulltrackClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    secret_key: String,
}

impl FulltrackClient {
    pub fn new(base_url: &str, api_key: &str, secret_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, UpstreamError> {
        counter!("upstream_requests_total").increment(1);
        let t0 = Instant::now();
        let result = self.get_json_inner(url, timeout).await;
        histogram!("upstream_request_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        if result.is_err() {
            counter!("upstream_errors_total").increment(1);
        }
        result
    }

    async fn get_json_inner<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, UpstreamError> {
        let resp = self
            .http
            .get(url)
            .header("Content-Type", "application/json")
            .header("ApiKey", self.api_key.as_str())
            .header("SecretKey", self.secret_key.as_str())
            .timeout(timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        Ok(resp.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl TelemetryApi for FulltrackClient {
    async fn list_alerts(&self) -> AlertBatch {
        let url = format!("{}/alerts/all", self.base_url);
        match self.get_json::<AlertBatch>(&url, LIST_ALERTS_TIMEOUT).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(error = ?e, "alert listing failed");
                AlertBatch::failed(e.to_string())
            }
        }
    }

    async fn fetch_event_detail(
        &self,
        vehicle_id: i64,
    ) -> Result<Option<EventDetail>, UpstreamError> {
        let url = format!("{}/events/single/id/{}", self.base_url, vehicle_id);
        let resp = self
            .get_json::<EventsResponse>(&url, EVENT_DETAIL_TIMEOUT)
            .await?;
        if !resp.status {
            return Ok(None);
        }
        Ok(resp.data.into_iter().next())
    }
}
