//! IngestorActor - subscribes to the bus and feeds the relay
//!
//! The actor owns the MQTT client and its event loop. Every publish on one
//! of the four consumed topics is decoded, dispatched to the state store and
//! fanned out as exactly one `DataUpdate` event (alert-topic messages
//! additionally produce one `NewAlert` event).
//!
//! ## Message Flow
//!
//! ```text
//! Broker publish → decode JSON → classify by topic → StateHandle mutation
//!                                                   → StreamEvent fan-out
//! ```
//!
//! A payload that fails to decode is logged and dropped: nothing is stored,
//! nothing reaches subscribers, and the next message is processed normally.
//! A lost broker connection pauses ingestion until the event loop's
//! reconnect cycle brings it back; subscriptions are re-established on every
//! connection acknowledgment.

use std::time::Duration;

use chrono::Utc;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, trace, warn};

use crate::{ComponentHealth, Fields, config::BrokerConfig, actors::state::StateHandle};

use super::messages::{IngestorCommand, StreamEvent, Topic};

/// Pause between reconnect attempts after a connection error
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Decodes bus messages and routes them to the state store and the stream.
///
/// Kept separate from the actor so the decode/classify/dispatch path can be
/// driven directly, without a broker.
pub struct Dispatcher {
    state: StateHandle,
    stream_tx: broadcast::Sender<StreamEvent>,
}

impl Dispatcher {
    pub fn new(state: StateHandle, stream_tx: broadcast::Sender<StreamEvent>) -> Self {
        Self { state, stream_tx }
    }

    /// Decode and relay a single bus message.
    pub async fn handle_message(&self, topic: &str, payload: &[u8]) {
        let fields: Fields = match serde_json::from_slice(payload) {
            Ok(fields) => fields,
            Err(e) => {
                warn!("dropping undecodable payload on {topic}: {e}");
                return;
            }
        };

        let timestamp = Utc::now();

        match Topic::parse(topic) {
            Some(t) => {
                if !self.dispatch(t, fields.clone()).await {
                    return;
                }
            }
            // Still relayed below: subscribers see every decoded message,
            // handler or not.
            None => debug!("no dedicated handler for topic {topic}"),
        }

        let receivers = self.stream_tx.send(StreamEvent::DataUpdate {
            topic: topic.to_string(),
            payload: fields,
            timestamp,
        });
        trace!(
            "relayed {topic} update to {} subscribers",
            receivers.unwrap_or(0)
        );
    }

    /// Route a classified message to its state-store operation.
    ///
    /// Returns `false` when the store rejected the message (actor shutting
    /// down), in which case no fan-out happens either.
    async fn dispatch(&self, topic: Topic, fields: Fields) -> bool {
        match topic {
            Topic::SensorsRaw => {
                if let Err(e) = self.state.record_sensor_reading(fields).await {
                    error!("failed to store sensor reading: {e}");
                    return false;
                }
            }

            Topic::EmergentAlerts => match self.state.record_alert(fields).await {
                Ok(alert) => {
                    let _ = self.stream_tx.send(StreamEvent::NewAlert(alert));
                }
                Err(e) => {
                    error!("failed to store alert: {e}");
                    return false;
                }
            },

            Topic::Predictions => {
                if let Err(e) = self.state.replace_prediction(fields).await {
                    error!("failed to store prediction: {e}");
                    return false;
                }
            }

            Topic::Anomalies => {
                self.state.increment_anomaly_count().await;
            }
        }

        self.state
            .update_component_status(topic.component(), ComponentHealth::Online)
            .await;

        true
    }
}

/// Actor that consumes the four hub topics from the MQTT broker
pub struct IngestorActor {
    /// MQTT client (kept for subscribing on reconnects)
    client: AsyncClient,

    /// MQTT event loop driving the connection
    event_loop: rumqttc::EventLoop,

    /// Decode/classify/dispatch logic
    dispatcher: Dispatcher,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<IngestorCommand>,
}

impl IngestorActor {
    pub fn new(
        broker: &BrokerConfig,
        state: StateHandle,
        stream_tx: broadcast::Sender<StreamEvent>,
        command_rx: mpsc::Receiver<IngestorCommand>,
    ) -> Self {
        let mut options =
            MqttOptions::new(broker.client_id.clone(), broker.host.clone(), broker.port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, event_loop) = AsyncClient::new(options, 64);

        Self {
            client,
            event_loop,
            dispatcher: Dispatcher::new(state, stream_tx),
            command_rx,
        }
    }

    /// Run the actor's main loop
    pub async fn run(mut self) {
        debug!("starting ingestor actor");

        loop {
            tokio::select! {
                event = self.event_loop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("connected to broker");
                        Self::subscribe_topics(&self.client).await;
                    }

                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        self.dispatcher
                            .handle_message(&publish.topic, &publish.payload)
                            .await;
                    }

                    Ok(_) => {}

                    Err(e) => {
                        // Ingestion pauses here; the next poll reconnects.
                        warn!("lost connection to broker: {e}");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                },

                Some(cmd) = self.command_rx.recv() => match cmd {
                    IngestorCommand::Shutdown => {
                        debug!("received shutdown command");
                        break;
                    }
                },
            }
        }

        debug!("ingestor actor stopped");
    }

    async fn subscribe_topics(client: &AsyncClient) {
        for topic in Topic::ALL {
            if let Err(e) = client.subscribe(topic.as_str(), QoS::AtMostOnce).await {
                error!("failed to subscribe to {topic}: {e}");
            }
        }
    }
}

/// Handle for controlling the IngestorActor
#[derive(Clone)]
pub struct IngestorHandle {
    sender: mpsc::Sender<IngestorCommand>,
}

impl IngestorHandle {
    /// Spawn a new ingestor actor connected to the configured broker
    pub fn spawn(
        broker: &BrokerConfig,
        state: StateHandle,
        stream_tx: broadcast::Sender<StreamEvent>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);

        let actor = IngestorActor::new(broker, state, stream_tx, cmd_rx);
        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Shutdown the ingestor actor
    pub async fn shutdown(&self) {
        let _ = self.sender.send(IngestorCommand::Shutdown).await;
    }
}
