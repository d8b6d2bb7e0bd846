//! API shared state containing the actor handle and the stream channel

use tokio::sync::broadcast;

use crate::actors::{messages::StreamEvent, state::StateHandle};

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Handle to the state actor for snapshots and acknowledgments
    pub state: StateHandle,

    /// Broadcast sender for stream events (for WebSocket fan-out); handlers
    /// that perform an acknowledgment publish the transition here
    pub stream_tx: broadcast::Sender<StreamEvent>,
}

impl ApiState {
    pub fn new(state: StateHandle, stream_tx: broadcast::Sender<StreamEvent>) -> Self {
        Self { state, stream_tx }
    }
}
