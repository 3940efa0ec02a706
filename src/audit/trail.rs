//! In-memory audit trail recorder.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{AuditEvent, AuditSink};

/// In-memory recorder for audit events.
///
/// Stores events in a vector behind a mutex so one trail can be shared by
/// concurrent invocations. In production you would typically forward
/// decisions to a persistent audit log instead.
///
/// # Example
///
/// ```
/// use action_gate::audit::{AuditEvent, AuditOutcome, AuditSink, AuditTrail};
/// use action_gate::{ActionType, OperationVerb};
///
/// let trail = AuditTrail::new();
///
/// trail.record(&AuditEvent::new(
///     "inv-123",
///     ActionType::PreIssueAccessToken,
///     0,
///     OperationVerb::Replace,
///     "/accessToken/claims/email",
///     AuditOutcome::Admitted,
/// ));
///
/// assert_eq!(trail.events().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AuditTrail {
    events: Mutex<Vec<AuditEvent>>,
}

impl AuditTrail {
    /// Creates a new empty audit trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded events in recording order.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.lock().clone()
    }

    /// Returns the events recorded for one invocation.
    pub fn events_for(&self, invocation_id: &str) -> Vec<AuditEvent> {
        self.lock()
            .iter()
            .filter(|event| event.invocation_id() == invocation_id)
            .cloned()
            .collect()
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AuditEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuditSink for AuditTrail {
    fn record(&self, event: &AuditEvent) {
        self.lock().push(event.clone());
    }
}
