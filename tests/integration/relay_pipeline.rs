//! Integration tests for the ingest → store → fan-out pipeline

use greenhouse_monitoring::actors::messages::{StreamEvent, Topic};
use serde_json::json;

use crate::helpers::*;

#[tokio::test]
async fn critical_alert_bumps_counters_and_broadcasts_new_alert() {
    let hub = spawn_test_hub().await;
    let mut stream_rx = hub.stream_tx.subscribe();

    hub.dispatcher
        .handle_message(Topic::EmergentAlerts.as_str(), &alert_payload("CRITICAL"))
        .await;

    let snapshot = hub.state.snapshot().await.unwrap();
    assert_eq!(snapshot.statistics.total_alerts, 1);
    assert_eq!(snapshot.statistics.critical_alerts, 1);

    let mut new_alert = None;
    let mut data_updates = 0;
    while let Ok(event) = stream_rx.try_recv() {
        match event {
            StreamEvent::NewAlert(alert) => new_alert = Some(alert),
            StreamEvent::DataUpdate { .. } => data_updates += 1,
            other => panic!("unexpected event {other:?}"),
        }
    }

    let alert = new_alert.expect("newAlert should have been broadcast");
    assert!(!alert.acknowledged);
    assert!(alert.is_critical());
    assert_eq!(alert.id, snapshot.alerts[0].id);
    assert_eq!(data_updates, 1, "exactly one dataUpdate per ingested message");

    hub.state.shutdown().await;
}

#[tokio::test]
async fn sensor_window_drops_the_first_of_101_readings() {
    let hub = spawn_test_hub().await;

    for seq in 1..=101 {
        hub.dispatcher
            .handle_message(Topic::SensorsRaw.as_str(), &sensor_payload(seq))
            .await;
    }

    let snapshot = hub.state.snapshot().await.unwrap();
    assert_eq!(snapshot.sensor_data.len(), 100);
    assert_eq!(snapshot.sensor_data[0].fields["seq"], json!(2));
    assert_eq!(snapshot.sensor_data[99].fields["seq"], json!(101));
    assert!(
        snapshot
            .sensor_data
            .iter()
            .all(|r| r.fields["seq"] != json!(1)),
        "the oldest reading must be evicted"
    );

    hub.state.shutdown().await;
}

#[tokio::test]
async fn malformed_payload_is_dropped_without_side_effects() {
    let hub = spawn_test_hub().await;
    let mut stream_rx = hub.stream_tx.subscribe();

    hub.dispatcher
        .handle_message(Topic::SensorsRaw.as_str(), b"{truncated")
        .await;
    hub.dispatcher
        .handle_message(Topic::EmergentAlerts.as_str(), b"\"just a string\"")
        .await;

    let snapshot = hub.state.snapshot().await.unwrap();
    assert!(snapshot.sensor_data.is_empty());
    assert_eq!(snapshot.statistics.total_alerts, 0);
    assert!(
        stream_rx.try_recv().is_err(),
        "no fan-out for dropped messages"
    );

    // Subsequent traffic is processed normally.
    hub.dispatcher
        .handle_message(Topic::SensorsRaw.as_str(), &sensor_payload(1))
        .await;
    let snapshot = hub.state.snapshot().await.unwrap();
    assert_eq!(snapshot.sensor_data.len(), 1);

    hub.state.shutdown().await;
}

#[tokio::test]
async fn prediction_and_anomaly_topics_update_their_state() {
    let hub = spawn_test_hub().await;

    hub.dispatcher
        .handle_message(
            Topic::Predictions.as_str(),
            br#"{"harvest_kg": 120.5, "confidence": 0.8}"#,
        )
        .await;
    hub.dispatcher
        .handle_message(Topic::Anomalies.as_str(), br#"{"prediction": -1, "Tair": 38.2}"#)
        .await;
    hub.dispatcher
        .handle_message(
            Topic::Predictions.as_str(),
            br#"{"harvest_kg": 118.0, "confidence": 0.9}"#,
        )
        .await;

    let snapshot = hub.state.snapshot().await.unwrap();
    let prediction = snapshot.latest_prediction.expect("prediction stored");
    assert_eq!(
        prediction.fields["harvest_kg"],
        json!(118.0),
        "newest prediction replaces the prior one"
    );
    assert_eq!(snapshot.statistics.anomalies_detected, 1);

    hub.state.shutdown().await;
}

#[tokio::test]
async fn ingestion_traffic_marks_pipeline_layers_online() {
    let hub = spawn_test_hub().await;

    let before = hub.state.snapshot().await.unwrap();
    assert!(
        before
            .system_status
            .values()
            .all(|s| s.status == greenhouse_monitoring::ComponentHealth::Waiting)
    );

    hub.dispatcher
        .handle_message(Topic::SensorsRaw.as_str(), &sensor_payload(1))
        .await;

    let after = hub.state.snapshot().await.unwrap();
    assert_eq!(
        after.system_status["sensors"].status,
        greenhouse_monitoring::ComponentHealth::Online
    );
    assert_eq!(
        after.system_status["prediction"].status,
        greenhouse_monitoring::ComponentHealth::Waiting
    );

    hub.state.shutdown().await;
}
