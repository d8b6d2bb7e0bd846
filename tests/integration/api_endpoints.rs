//! Integration tests for the REST endpoints
//!
//! These tests verify that:
//! - The snapshot endpoint reflects the relayed state
//! - Alert acknowledgment is idempotent and 404s on unknown ids
//! - Error responses carry a JSON error body

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::Value;

use greenhouse_monitoring::actors::messages::Topic;

use crate::helpers::*;

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let hub = spawn_test_hub().await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/api/v1/health", hub.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    hub.state.shutdown().await;
}

#[tokio::test]
async fn state_endpoint_returns_full_snapshot() {
    let hub = spawn_test_hub().await;

    hub.dispatcher
        .handle_message(Topic::SensorsRaw.as_str(), &sensor_payload(1))
        .await;
    hub.dispatcher
        .handle_message(Topic::EmergentAlerts.as_str(), &alert_payload("CRITICAL"))
        .await;

    let client = reqwest::Client::new();
    let body: Value = client
        .get(format!("http://{}/api/v1/state", hub.addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["sensorData"].as_array().unwrap().len(), 1);
    assert_eq!(body["alerts"].as_array().unwrap().len(), 1);
    assert_eq!(body["alerts"][0]["severity"], "CRITICAL");
    assert_eq!(body["alerts"][0]["acknowledged"], false);
    assert_eq!(body["statistics"]["totalAlerts"], 1);
    assert_eq!(body["statistics"]["criticalAlerts"], 1);
    assert!(body["systemStatus"].is_object());

    hub.state.shutdown().await;
}

#[tokio::test]
async fn acknowledge_endpoint_is_idempotent() {
    let hub = spawn_test_hub().await;

    let alert = hub.state.record_alert(alert_fields("HIGH")).await.unwrap();

    let client = reqwest::Client::new();
    let url = format!("http://{}/api/v1/alerts/{}/acknowledge", hub.addr, alert.id);

    let first = client.post(&url).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first: Value = first.json().await.unwrap();
    assert_eq!(first["acknowledged"], true);
    let first_at = first["acknowledgedAt"].as_str().unwrap().to_string();

    let second = client.post(&url).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second: Value = second.json().await.unwrap();
    assert_eq!(
        second["acknowledgedAt"].as_str().unwrap(),
        first_at,
        "re-acknowledging must keep the original timestamp"
    );

    hub.state.shutdown().await;
}

#[tokio::test]
async fn acknowledge_unknown_alert_returns_not_found() {
    let hub = spawn_test_hub().await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{}/api/v1/alerts/987654/acknowledge", hub.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("987654"));

    // Nothing was mutated by the failed acknowledgment.
    let snapshot = hub.state.snapshot().await.unwrap();
    assert_eq!(snapshot.statistics.total_alerts, 0);

    hub.state.shutdown().await;
}

#[tokio::test]
async fn stats_endpoint_reports_counters_and_occupancy() {
    let hub = spawn_test_hub().await;

    for _ in 0..3 {
        hub.dispatcher
            .handle_message(Topic::EmergentAlerts.as_str(), &alert_payload("LOW"))
            .await;
    }
    hub.dispatcher
        .handle_message(Topic::Anomalies.as_str(), br#"{"prediction": -1}"#)
        .await;

    let client = reqwest::Client::new();
    let body: Value = client
        .get(format!("http://{}/api/v1/stats", hub.addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["statistics"]["totalAlerts"], 3);
    assert_eq!(body["statistics"]["criticalAlerts"], 0);
    assert_eq!(body["statistics"]["anomaliesDetected"], 1);
    assert_eq!(body["buffered"]["alerts"], 3);

    hub.state.shutdown().await;
}
