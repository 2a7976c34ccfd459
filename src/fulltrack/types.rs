// src/fulltrack/types.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Decoded body of `GET /alerts/all`.
///
/// Beyond `status` and `data` the schema is not validated; whatever else the
/// provider sends rides along in `extra` so the raw passthrough endpoint can
/// republish the response as decoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertBatch {
    #[serde(default)]
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Vec<RawAlert>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AlertBatch {
    /// The batch shape fabricated locally when the listing call fails.
    /// Callers check `status` instead of handling an error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: Some(message.into()),
            data: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// One alert record as Fulltrack returns it. Only the four fields the
/// pipeline consumes are typed; the rest stays in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawAlert {
    /// Vehicle reference; the provider sends numbers or numeric strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ras_eal_id_veiculo: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ras_eal_latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ras_eal_longitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ras_eal_data_alerta: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawAlert {
    /// Coerced vehicle id, or `None` when the reference is missing or not an
    /// integer in either representation.
    pub fn vehicle_id(&self) -> Option<i64> {
        coerce_vehicle_id(self.ras_eal_id_veiculo.as_ref())
    }
}

pub fn coerce_vehicle_id(raw: Option<&Value>) -> Option<i64> {
    match raw? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First-class fields of one record from `GET /events/single/id/{id}`.
/// Internal only; never republished.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct EventDetail {
    pub ras_mot_nome: Option<String>,
    pub ras_vei_veiculo: Option<String>,
    pub ras_vei_placa: Option<String>,
}

/// Decoded body of `GET /events/single/id/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub data: Vec<EventDetail>,
}
