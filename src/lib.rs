pub mod actors;
pub mod alerts;
pub mod api;
pub mod config;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alerts::Alert;

/// Decoded payload of a bus message: sensor-field-name → numeric/text value.
pub type Fields = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    Active,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub status: ReadingStatus,
    #[serde(flatten)]
    pub fields: Fields,
}

/// The most recently received prediction payload. At most one exists; each
/// new prediction fully replaces the prior one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionSnapshot {
    pub received_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Fields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentHealth {
    Online,
    Waiting,
    Offline,
}

impl std::fmt::Display for ComponentHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentHealth::Online => write!(f, "online"),
            ComponentHealth::Waiting => write!(f, "waiting"),
            ComponentHealth::Offline => write!(f, "offline"),
        }
    }
}

/// Health of one pipeline layer, refreshed when traffic is seen on its topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStatus {
    pub status: ComponentHealth,
    pub last_update: DateTime<Utc>,
}

/// Process-lifetime counters. Monotonically non-decreasing; `critical_alerts`
/// never exceeds `total_alerts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_alerts: u64,
    pub critical_alerts: u64,
    pub anomalies_detected: u64,
}

/// Consistent full copy of the hub state at one instant, used for the
/// `initialData` sync of a newly connected subscriber and for the REST
/// snapshot endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub sensor_data: Vec<SensorReading>,
    pub alerts: Vec<Alert>,
    pub latest_prediction: Option<PredictionSnapshot>,
    pub system_status: BTreeMap<String, ComponentStatus>,
    pub statistics: Statistics,
}
