//! Test helpers and utilities for integration tests

use std::net::SocketAddr;

use greenhouse_monitoring::{
    Fields,
    actors::{ingestor::Dispatcher, messages::StreamEvent, state::StateHandle},
    api::{ApiConfig, ApiState, spawn_api_server},
};
use serde_json::json;
use tokio::sync::broadcast;

/// A fully wired hub minus the broker: bus messages are injected through
/// the dispatcher exactly as the ingestor actor would.
pub struct TestHub {
    pub state: StateHandle,
    pub stream_tx: broadcast::Sender<StreamEvent>,
    pub dispatcher: Dispatcher,
    pub addr: SocketAddr,
}

pub async fn spawn_test_hub() -> TestHub {
    let state = StateHandle::spawn();
    let (stream_tx, _) = broadcast::channel(256);
    let dispatcher = Dispatcher::new(state.clone(), stream_tx.clone());

    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        enable_cors: true,
    };
    let addr = spawn_api_server(config, ApiState::new(state.clone(), stream_tx.clone()))
        .await
        .unwrap();

    TestHub {
        state,
        stream_tx,
        dispatcher,
        addr,
    }
}

pub fn sensor_payload(seq: usize) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "seq": seq,
        "Tair": 20.0 + seq as f64 * 0.1,
        "Rhair": 60.0,
    }))
    .unwrap()
}

pub fn alert_payload(severity: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "severity": severity,
        "message": "test alert",
        "agent": "anomaly_alert",
    }))
    .unwrap()
}

pub fn alert_fields(severity: &str) -> Fields {
    match json!({"severity": severity, "message": "test alert"}) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}
