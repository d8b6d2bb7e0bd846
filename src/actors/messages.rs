//! Message types for actor communication
//!
//! ## Design Principles
//!
//! 1. **Commands**: Request/response messages sent to specific actors via mpsc
//! 2. **Events**: Broadcast notifications published to multiple subscribers
//! 3. **Immutability**: All events are cloneable for multi-subscriber patterns

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

use crate::{
    ComponentHealth, Fields, PredictionSnapshot, SensorReading, StateSnapshot,
    alerts::{AckResult, Alert},
};

/// The four bus topics the hub consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// Raw sensor telemetry
    SensorsRaw,

    /// Emergent alerts produced by the anomaly-alert agent
    EmergentAlerts,

    /// Harvest/condition predictions
    Predictions,

    /// Anomaly detections from the inference layer
    Anomalies,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::SensorsRaw,
        Topic::EmergentAlerts,
        Topic::Predictions,
        Topic::Anomalies,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Topic::SensorsRaw => "invernadero/sensores/raw",
            Topic::EmergentAlerts => "invernadero/alertas/emergentes",
            Topic::Predictions => "invernadero/predicciones",
            Topic::Anomalies => "invernadero/anomalias",
        }
    }

    pub fn parse(topic: &str) -> Option<Topic> {
        Topic::ALL.into_iter().find(|t| t.as_str() == topic)
    }

    /// Name of the pipeline layer whose health this topic's traffic reflects.
    pub const fn component(&self) -> &'static str {
        match self {
            Topic::SensorsRaw => "sensors",
            Topic::EmergentAlerts => "alert_agent",
            Topic::Predictions => "prediction",
            Topic::Anomalies => "anomaly_detection",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands that can be sent to the StateActor
///
/// Every command is handled to completion before the next is taken from the
/// mailbox, which is what makes each operation atomic with respect to
/// concurrent callers.
#[derive(Debug)]
pub enum StateCommand {
    /// Store a decoded sensor payload, assigning id and timestamp
    RecordSensorReading {
        fields: Fields,
        respond_to: oneshot::Sender<SensorReading>,
    },

    /// Store a decoded alert payload, assigning id, timestamp and the
    /// initial unacknowledged lifecycle state
    RecordAlert {
        fields: Fields,
        respond_to: oneshot::Sender<Alert>,
    },

    /// Replace the single prediction snapshot
    ReplacePrediction {
        fields: Fields,
        respond_to: oneshot::Sender<PredictionSnapshot>,
    },

    /// Count one anomaly detection
    IncrementAnomalyCount,

    /// Refresh the health of a named pipeline layer
    UpdateComponentStatus {
        component: String,
        status: ComponentHealth,
    },

    /// Acknowledge an alert by id (idempotent; NotFound for unknown ids)
    Acknowledge {
        alert_id: u64,
        respond_to: oneshot::Sender<AckResult>,
    },

    /// Take a consistent point-in-time copy of the full state
    Snapshot {
        respond_to: oneshot::Sender<StateSnapshot>,
    },

    /// Gracefully shut down the state actor
    Shutdown,
}

/// Commands that can be sent to the IngestorActor
#[derive(Debug)]
pub enum IngestorCommand {
    /// Gracefully shut down the ingestor
    Shutdown,
}

/// Event published once per relayed update
///
/// Every connected dashboard holds its own broadcast receiver. The channel
/// may lag for slow subscribers, dropping their oldest undelivered events -
/// ingestion never waits for delivery.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// One successfully decoded bus message (any topic)
    DataUpdate {
        topic: String,
        payload: Fields,
        timestamp: DateTime<Utc>,
    },

    /// A freshly stored alert, carrying the full record
    NewAlert(Alert),

    /// An alert made the `New → Acknowledged` transition
    AlertAcknowledged { alert_id: u64 },
}
