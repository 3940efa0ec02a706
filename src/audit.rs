//! Audit records for operation filtering.
//!
//! This module provides:
//! - `AuditEvent`: one admit/reject decision for one proposed operation
//! - `AuditSink`: where the executor sends those decisions
//! - `TracingAuditSink`: emits each decision as a structured tracing event
//! - `AuditTrail`: in-memory recorder
//!
//! Audit events are safe to log:
//! - Only verb and path of a proposed operation are recorded, never its value
//! - The event snapshot sent to the action is never recorded
//!
//! Recording a decision never changes which operations are admitted.

mod event;
mod trail;
mod tracing_sink;

pub use event::{AuditEvent, AuditOutcome};
pub use trail::AuditTrail;
pub use tracing_sink::TracingAuditSink;

/// Receives one [`AuditEvent`] per proposed operation.
pub trait AuditSink: Send + Sync {
    /// Records a filtering decision.
    fn record(&self, event: &AuditEvent);
}
