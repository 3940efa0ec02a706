//! Audit sink that emits decisions through tracing.

use super::{AuditEvent, AuditOutcome, AuditSink};

/// Emits each audit event as a structured `tracing` event.
///
/// Events go to the `action_gate::audit` target: admitted operations at
/// `INFO`, rejected ones at `WARN`. This is the executor's default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Creates the sink.
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        match event.outcome() {
            AuditOutcome::Admitted => tracing::info!(
                target: "action_gate::audit",
                invocation_id = %event.invocation_id(),
                action_type = %event.action_type(),
                index = event.index(),
                op = %event.op(),
                path = %event.path(),
                outcome = %event.outcome(),
                "operation admitted"
            ),
            AuditOutcome::Rejected => tracing::warn!(
                target: "action_gate::audit",
                invocation_id = %event.invocation_id(),
                action_type = %event.action_type(),
                index = event.index(),
                op = %event.op(),
                path = %event.path(),
                outcome = %event.outcome(),
                "operation rejected"
            ),
        }
    }
}
