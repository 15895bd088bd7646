//! Audit logger trait, audit events and in-memory implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{read, write};
use crate::error::ServiceError;

/// Kinds of events written to the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventKind {
    OrderProcessStarted,
    OrderFailed,
    OrderSuccess,
    RefundProcessStarted,
    RefundFailed,
    RefundSuccess,
    StockAdded,
    PriceUpdated,
}

impl AuditEventKind {
    /// Returns the wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventKind::OrderProcessStarted => "ORDER_PROCESS_STARTED",
            AuditEventKind::OrderFailed => "ORDER_FAILED",
            AuditEventKind::OrderSuccess => "ORDER_SUCCESS",
            AuditEventKind::RefundProcessStarted => "REFUND_PROCESS_STARTED",
            AuditEventKind::RefundFailed => "REFUND_FAILED",
            AuditEventKind::RefundSuccess => "REFUND_SUCCESS",
            AuditEventKind::StockAdded => "STOCK_ADDED",
            AuditEventKind::PriceUpdated => "PRICE_UPDATED",
        }
    }
}

impl std::fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub kind: AuditEventKind,
    pub details: BTreeMap<String, serde_json::Value>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates an event with no details.
    pub fn new(kind: AuditEventKind) -> Self {
        Self {
            kind,
            details: BTreeMap::new(),
            recorded_at: Utc::now(),
        }
    }

    /// Adds a detail entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns a detail entry by key.
    pub fn detail(&self, key: &str) -> Option<&serde_json::Value> {
        self.details.get(key)
    }
}

/// Trait for the audit trail.
#[async_trait]
pub trait AuditLogger: Send + Sync {
    async fn log_event(&self, event: AuditEvent) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryAuditState {
    events: Vec<AuditEvent>,
    fail_on_log: bool,
}

/// In-memory audit logger that also mirrors each event to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLogger {
    state: Arc<RwLock<InMemoryAuditState>>,
}

impl InMemoryAuditLogger {
    /// Creates a new in-memory audit logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every log call to fail.
    pub fn set_fail_on_log(&self, fail: bool) {
        write(&self.state).fail_on_log = fail;
    }

    /// Returns every recorded event, in order.
    pub fn events(&self) -> Vec<AuditEvent> {
        read(&self.state).events.clone()
    }

    /// Returns the kinds of every recorded event, in order.
    pub fn kinds(&self) -> Vec<AuditEventKind> {
        read(&self.state).events.iter().map(|e| e.kind).collect()
    }

    /// Returns the most recent event.
    pub fn last(&self) -> Option<AuditEvent> {
        read(&self.state).events.last().cloned()
    }
}

#[async_trait]
impl AuditLogger for InMemoryAuditLogger {
    async fn log_event(&self, event: AuditEvent) -> Result<(), ServiceError> {
        let mut state = write(&self.state);
        if state.fail_on_log {
            return Err(ServiceError::Unavailable("audit sink full".to_string()));
        }

        tracing::info!(
            target: "audit",
            kind = %event.kind,
            details = %serde_json::Value::Object(
                event.details.clone().into_iter().collect()
            ),
            "audit event"
        );
        state.events.push(event);
        Ok(())
    }
}
