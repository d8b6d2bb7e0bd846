//! Alert records and their acknowledgment lifecycle
//!
//! An alert is born from an emergent-alert bus message and only ever makes
//! one transition:
//!
//! ```text
//! New (acknowledged = false)
//!   │  acknowledge (REST call or subscriber action)
//!   ▼
//! Acknowledged (acknowledged = true, acknowledged_at set)   [terminal]
//! ```
//!
//! Acknowledging an already-acknowledged alert is a no-op that still reports
//! success; there is no un-acknowledge transition.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Fields;

/// Severity classification carried by emergent alerts.
///
/// The upstream anomaly-alert agent emits one of the four named tags;
/// `Critical` is counted separately in the hub statistics. Anything else
/// (missing or unrecognized severity field) maps to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Unknown,
}

impl Severity {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "CRITICAL" => Severity::Critical,
            "HIGH" => Severity::High,
            "MEDIUM" => Severity::Medium,
            "LOW" => Severity::Low,
            _ => Severity::Unknown,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::Low => write!(f, "LOW"),
            Severity::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: u64,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Alert {
    /// Build an alert from a decoded bus payload.
    ///
    /// The `severity` key is lifted out of the payload into the typed field;
    /// hub-assigned keys win over producer-sent ones (the alert agent also
    /// stamps a `timestamp` of its own); all remaining keys are kept
    /// verbatim.
    pub fn from_fields(id: u64, timestamp: DateTime<Utc>, mut fields: Fields) -> Self {
        let severity = fields
            .remove("severity")
            .and_then(|value| value.as_str().map(Severity::from_tag))
            .unwrap_or(Severity::Unknown);

        for reserved in ["id", "timestamp", "acknowledged", "acknowledgedAt"] {
            fields.remove(reserved);
        }

        Self {
            id,
            severity,
            timestamp,
            acknowledged: false,
            acknowledged_at: None,
            fields,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }

    /// Perform the `New → Acknowledged` transition.
    ///
    /// Returns `true` when this call performed the transition, `false` when
    /// the alert was already acknowledged. In the latter case the original
    /// acknowledgment timestamp is kept.
    pub fn acknowledge(&mut self, at: DateTime<Utc>) -> bool {
        if self.acknowledged {
            return false;
        }

        self.acknowledged = true;
        self.acknowledged_at = Some(at);
        true
    }
}

/// Outcome of a successful acknowledgment call
#[derive(Debug, Clone)]
pub struct Acknowledgment {
    /// The alert in its acknowledged state
    pub alert: Alert,

    /// False when the alert had already been acknowledged and this call was
    /// an idempotent no-op. Only a true transition is broadcast.
    pub transitioned: bool,
}

/// Result type alias for acknowledgment operations
pub type AckResult = Result<Acknowledgment, AckError>;

/// Errors that can occur when acknowledging an alert
#[derive(Debug)]
pub enum AckError {
    /// No alert with the given identifier is currently retained
    NotFound(u64),

    /// The state store actor is no longer running
    StoreClosed,
}

impl fmt::Display for AckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AckError::NotFound(id) => write!(f, "no alert with id {}", id),
            AckError::StoreClosed => write!(f, "state store unavailable"),
        }
    }
}

impl std::error::Error for AckError {}
