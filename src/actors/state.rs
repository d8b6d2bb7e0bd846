//! StateActor - single owner of the bounded in-memory hub state
//!
//! ## Architecture
//!
//! All collections live in [`StateStore`]; the actor is the only thing that
//! touches them. Every mutation and every snapshot is one mailbox message,
//! processed to completion before the next, so no caller can observe a
//! partially-applied mutation (e.g. an alert counted in `total_alerts` but
//! not yet present in the alert list).
//!
//! ## Bounded windows
//!
//! - Sensor readings: ring buffer of 100, FIFO eviction by insertion order
//! - Alerts: newest-first list of 50, overflow truncates the tail
//! - Prediction: a single slot, each ingestion replaces the prior one
//!
//! Statistics counters are process-lifetime and keep counting through
//! eviction.

use std::collections::{BTreeMap, VecDeque};

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::{
    ComponentHealth, ComponentStatus, Fields, PredictionSnapshot, ReadingStatus, SensorReading,
    StateSnapshot, Statistics,
    alerts::{AckError, AckResult, Acknowledgment, Alert},
};

use super::messages::{StateCommand, Topic};

/// Maximum sensor readings retained (FIFO eviction)
const MAX_SENSOR_READINGS: usize = 100;

/// Maximum alerts retained (newest first, tail truncated)
const MAX_ALERTS: usize = 50;

/// The bounded in-memory state of the hub.
///
/// Owned exclusively by the [`StateActor`] at runtime; the struct itself is
/// synchronous so the invariants can be exercised directly in tests.
#[derive(Debug)]
pub struct StateStore {
    /// Recent sensor readings, oldest at the front
    sensor_data: VecDeque<SensorReading>,

    /// Recent alerts, newest at the front
    alerts: VecDeque<Alert>,

    /// The single prediction slot
    latest_prediction: Option<PredictionSnapshot>,

    /// Per pipeline-layer health
    system_status: BTreeMap<String, ComponentStatus>,

    /// Monotonic counters
    statistics: Statistics,

    /// Arrival counter used to assign record identifiers
    next_id: u64,
}

impl StateStore {
    pub fn new() -> Self {
        // Seed every pipeline layer as waiting; ingestion traffic flips the
        // owning layer to online.
        let seeded_at = Utc::now();
        let system_status = Topic::ALL
            .into_iter()
            .map(|topic| {
                (
                    topic.component().to_string(),
                    ComponentStatus {
                        status: ComponentHealth::Waiting,
                        last_update: seeded_at,
                    },
                )
            })
            .collect();

        Self {
            sensor_data: VecDeque::with_capacity(MAX_SENSOR_READINGS),
            alerts: VecDeque::with_capacity(MAX_ALERTS),
            latest_prediction: None,
            system_status,
            statistics: Statistics::default(),
            next_id: 1,
        }
    }

    fn assign_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert a sensor reading, evicting the oldest entry beyond the window.
    pub fn record_sensor_reading(&mut self, mut fields: Fields) -> SensorReading {
        // Hub-assigned keys win over producer-sent ones.
        for reserved in ["id", "timestamp", "status"] {
            fields.remove(reserved);
        }

        let reading = SensorReading {
            id: self.assign_id(),
            timestamp: Utc::now(),
            status: ReadingStatus::Active,
            fields,
        };

        self.sensor_data.push_back(reading.clone());
        if self.sensor_data.len() > MAX_SENSOR_READINGS {
            self.sensor_data.pop_front();
        }

        reading
    }

    /// Prepend an alert, bump the counters and truncate to the window.
    pub fn record_alert(&mut self, fields: Fields) -> Alert {
        let alert = Alert::from_fields(self.assign_id(), Utc::now(), fields);

        self.statistics.total_alerts += 1;
        if alert.is_critical() {
            self.statistics.critical_alerts += 1;
        }

        self.alerts.push_front(alert.clone());
        self.alerts.truncate(MAX_ALERTS);

        alert
    }

    pub fn replace_prediction(&mut self, fields: Fields) -> PredictionSnapshot {
        let prediction = PredictionSnapshot {
            received_at: Utc::now(),
            fields,
        };
        self.latest_prediction = Some(prediction.clone());
        prediction
    }

    pub fn increment_anomaly_count(&mut self) {
        self.statistics.anomalies_detected += 1;
    }

    pub fn update_component_status(&mut self, component: String, status: ComponentHealth) {
        self.system_status.insert(
            component,
            ComponentStatus {
                status,
                last_update: Utc::now(),
            },
        );
    }

    /// Acknowledge the alert with the given id.
    ///
    /// Idempotent: a second acknowledgment returns the alert unchanged,
    /// keeping the original acknowledgment timestamp. Unknown ids (never
    /// seen, or already evicted from the window) are a not-found condition
    /// and mutate nothing.
    pub fn acknowledge(&mut self, alert_id: u64) -> AckResult {
        let Some(alert) = self.alerts.iter_mut().find(|a| a.id == alert_id) else {
            return Err(AckError::NotFound(alert_id));
        };

        let transitioned = alert.acknowledge(Utc::now());
        Ok(Acknowledgment {
            alert: alert.clone(),
            transitioned,
        })
    }

    /// Copy the full state at one instant.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            sensor_data: self.sensor_data.iter().cloned().collect(),
            alerts: self.alerts.iter().cloned().collect(),
            latest_prediction: self.latest_prediction.clone(),
            system_status: self.system_status.clone(),
            statistics: self.statistics.clone(),
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Actor wrapping a [`StateStore`] behind a command mailbox
pub struct StateActor {
    store: StateStore,

    /// Command receiver
    command_rx: mpsc::Receiver<StateCommand>,
}

impl StateActor {
    pub fn new(command_rx: mpsc::Receiver<StateCommand>) -> Self {
        Self {
            store: StateStore::new(),
            command_rx,
        }
    }

    /// Run the actor's main loop
    pub async fn run(mut self) {
        debug!("starting state actor");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                StateCommand::RecordSensorReading { fields, respond_to } => {
                    let reading = self.store.record_sensor_reading(fields);
                    trace!("stored sensor reading {}", reading.id);
                    let _ = respond_to.send(reading);
                }

                StateCommand::RecordAlert { fields, respond_to } => {
                    let alert = self.store.record_alert(fields);
                    debug!("stored alert {} ({})", alert.id, alert.severity);
                    let _ = respond_to.send(alert);
                }

                StateCommand::ReplacePrediction { fields, respond_to } => {
                    let prediction = self.store.replace_prediction(fields);
                    trace!("replaced prediction snapshot");
                    let _ = respond_to.send(prediction);
                }

                StateCommand::IncrementAnomalyCount => {
                    self.store.increment_anomaly_count();
                }

                StateCommand::UpdateComponentStatus { component, status } => {
                    self.store.update_component_status(component, status);
                }

                StateCommand::Acknowledge {
                    alert_id,
                    respond_to,
                } => {
                    let result = self.store.acknowledge(alert_id);
                    if let Err(e) = &result {
                        debug!("acknowledge failed: {e}");
                    }
                    let _ = respond_to.send(result);
                }

                StateCommand::Snapshot { respond_to } => {
                    let _ = respond_to.send(self.store.snapshot());
                }

                StateCommand::Shutdown => {
                    debug!("received shutdown command");
                    break;
                }
            }
        }

        debug!("state actor stopped");
    }
}

/// Handle for the StateActor
///
/// The only access path to the hub state; cloneable and cheap to share.
#[derive(Clone)]
pub struct StateHandle {
    sender: mpsc::Sender<StateCommand>,
}

impl StateHandle {
    /// Spawn a new state actor and return its handle
    pub fn spawn() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);

        let actor = StateActor::new(cmd_rx);
        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    pub async fn record_sensor_reading(&self, fields: Fields) -> anyhow::Result<SensorReading> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(StateCommand::RecordSensorReading {
                fields,
                respond_to: tx,
            })
            .await?;

        Ok(rx.await?)
    }

    pub async fn record_alert(&self, fields: Fields) -> anyhow::Result<Alert> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(StateCommand::RecordAlert {
                fields,
                respond_to: tx,
            })
            .await?;

        Ok(rx.await?)
    }

    pub async fn replace_prediction(&self, fields: Fields) -> anyhow::Result<PredictionSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(StateCommand::ReplacePrediction {
                fields,
                respond_to: tx,
            })
            .await?;

        Ok(rx.await?)
    }

    pub async fn increment_anomaly_count(&self) {
        let _ = self.sender.send(StateCommand::IncrementAnomalyCount).await;
    }

    pub async fn update_component_status(&self, component: &str, status: ComponentHealth) {
        let _ = self
            .sender
            .send(StateCommand::UpdateComponentStatus {
                component: component.to_string(),
                status,
            })
            .await;
    }

    /// Acknowledge an alert by id.
    ///
    /// Unknown ids return [`AckError::NotFound`] promptly; a closed actor
    /// maps to [`AckError::StoreClosed`].
    pub async fn acknowledge(&self, alert_id: u64) -> AckResult {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(StateCommand::Acknowledge {
                alert_id,
                respond_to: tx,
            })
            .await
            .map_err(|_| AckError::StoreClosed)?;

        rx.await.map_err(|_| AckError::StoreClosed)?
    }

    pub async fn snapshot(&self) -> anyhow::Result<StateSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(StateCommand::Snapshot { respond_to: tx })
            .await?;

        Ok(rx.await?)
    }

    /// Shutdown the state actor
    pub async fn shutdown(&self) {
        let _ = self.sender.send(StateCommand::Shutdown).await;
    }
}
