//! Hub statistics endpoint

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::api::{error::ApiResult, state::ApiState};

/// GET /api/v1/stats
///
/// Returns the monotonic counters plus the current relay occupancy
pub async fn get_stats(State(state): State<ApiState>) -> ApiResult<Json<Value>> {
    let snapshot = state.state.snapshot().await?;

    Ok(Json(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "statistics": snapshot.statistics,
        "subscribers": state.stream_tx.receiver_count(),
        "buffered": {
            "sensorReadings": snapshot.sensor_data.len(),
            "alerts": snapshot.alerts.len(),
        },
    })))
}
