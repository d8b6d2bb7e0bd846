//! Actor-based relay core
//!
//! This module implements the hub's relay pipeline as independent async
//! tasks communicating via Tokio channels.
//!
//! ## Architecture Overview
//!
//! ```text
//!        ┌──────────────┐
//!        │ MQTT broker  │
//!        └──────┬───────┘
//!               │ publishes (4 topics)
//!       ┌───────▼────────┐   StateCommand    ┌──────────────┐
//!       │ IngestorActor  ├──────(mpsc)──────►│  StateActor  │
//!       └───────┬────────┘                   └──────▲───────┘
//!               │ StreamEvent                       │ StateCommand
//!       ┌───────▼────────┐                          │
//!       │ Broadcast      │                   ┌──────┴───────┐
//!       │ Channel (MPMC) │◄──────────────────┤ API / WS     │
//!       └───────┬────────┘  AlertAcknowledged│ handlers     │
//!               │ subscribe                  └──────▲───────┘
//!        ┌──────▼────────┐                          │
//!        │ one receiver  │──────────────────────────┘
//!        │ per dashboard │   requestData / acknowledgeAlert
//!        └───────────────┘
//! ```
//!
//! ## Actor Types
//!
//! - **IngestorActor**: subscribes to the bus topics, decodes payloads and
//!   dispatches them to the state store, then fans each update out
//! - **StateActor**: single owner of the bounded in-memory state; every
//!   mutation and snapshot is one mailbox message and therefore atomic
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: each actor has an mpsc command channel for control messages
//! 2. **Events**: ingested updates are published to a broadcast channel; every
//!    connected dashboard holds its own bounded receiver, so a slow subscriber
//!    lags (dropping its oldest undelivered events) without stalling ingestion
//! 3. **Request/Response**: oneshot channels for synchronous queries

pub mod ingestor;
pub mod messages;
pub mod state;
