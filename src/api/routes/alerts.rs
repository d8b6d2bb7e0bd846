//! Alert acknowledgment endpoint

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

use crate::{
    actors::messages::StreamEvent,
    alerts::Alert,
    api::{error::ApiResult, state::ApiState},
};

/// POST /api/v1/alerts/:id/acknowledge
///
/// Acknowledge an alert by id. Idempotent: re-acknowledging returns the same
/// alert with its original acknowledgment timestamp. Unknown ids yield 404
/// without mutating anything.
pub async fn acknowledge_alert(
    State(state): State<ApiState>,
    Path(alert_id): Path<u64>,
) -> ApiResult<Json<Alert>> {
    let ack = state.state.acknowledge(alert_id).await?;

    if ack.transitioned {
        info!("alert {alert_id} acknowledged via api");
        let _ = state
            .stream_tx
            .send(StreamEvent::AlertAcknowledged { alert_id });
    }

    Ok(Json(ack.alert))
}
