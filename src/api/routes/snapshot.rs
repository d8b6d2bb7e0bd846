//! Full state snapshot endpoint

use axum::{Json, extract::State};

use crate::{
    StateSnapshot,
    api::{error::ApiResult, state::ApiState},
};

/// GET /api/v1/state
///
/// Returns the full current hub state: recent sensor readings, recent
/// alerts, the latest prediction, component statuses and statistics - the
/// same payload a WebSocket subscriber receives as `initialData`.
pub async fn get_state(State(state): State<ApiState>) -> ApiResult<Json<StateSnapshot>> {
    let snapshot = state.state.snapshot().await?;
    Ok(Json(snapshot))
}
