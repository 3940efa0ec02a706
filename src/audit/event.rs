//! Audit event schema.

use std::fmt;

use crate::gate::OperationDecision;
use crate::operation::{OperationPath, OperationVerb};
use crate::request::ActionType;

/// Whether a proposed operation made it through the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// Covered by an allowed operation and passed on
    Admitted,
    /// Not covered and dropped
    Rejected,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Admitted => write!(f, "admitted"),
            AuditOutcome::Rejected => write!(f, "rejected"),
        }
    }
}

/// A record of one filtering decision.
///
/// # Safety Invariants
///
/// - The proposed value is never stored
/// - No part of the event snapshot is stored
///
/// # Example
///
/// ```
/// use action_gate::audit::{AuditEvent, AuditOutcome};
/// use action_gate::{ActionType, OperationVerb};
///
/// let event = AuditEvent::new(
///     "inv-123",
///     ActionType::PreIssueAccessToken,
///     0,
///     OperationVerb::Add,
///     "/accessToken/claims/role",
///     AuditOutcome::Rejected,
/// );
///
/// assert_eq!(event.invocation_id(), "inv-123");
/// assert_eq!(event.outcome(), AuditOutcome::Rejected);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    invocation_id: String,
    action_type: ActionType,
    /// Position of the operation in the action's response
    index: usize,
    op: OperationVerb,
    path: OperationPath,
    outcome: AuditOutcome,
}

impl AuditEvent {
    /// Creates an audit event.
    pub fn new(
        invocation_id: impl Into<String>,
        action_type: ActionType,
        index: usize,
        op: OperationVerb,
        path: impl Into<OperationPath>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            action_type,
            index,
            op,
            path: path.into(),
            outcome,
        }
    }

    /// Creates the audit event for a gate decision.
    pub fn from_decision(
        invocation_id: &str,
        action_type: ActionType,
        decision: &OperationDecision,
    ) -> Self {
        let outcome = if decision.admitted {
            AuditOutcome::Admitted
        } else {
            AuditOutcome::Rejected
        };

        Self::new(
            invocation_id,
            action_type,
            decision.index,
            decision.op,
            decision.path.clone(),
            outcome,
        )
    }

    /// Returns the invocation identifier.
    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    /// Returns the action type of the invocation.
    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    /// Returns the operation's position in the response.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the proposed verb.
    pub fn op(&self) -> OperationVerb {
        self.op
    }

    /// Returns the proposed path.
    pub fn path(&self) -> &OperationPath {
        &self.path
    }

    /// Returns the decision.
    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuditEvent[outcome={}, invocation_id={}, action_type={}, index={}, op={}, path={}]",
            self.outcome, self.invocation_id, self.action_type, self.index, self.op, self.path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_outcome_display() {
        assert_eq!(AuditOutcome::Admitted.to_string(), "admitted");
        assert_eq!(AuditOutcome::Rejected.to_string(), "rejected");
    }

    #[test]
    fn from_decision_maps_admitted_flag() {
        let decision = OperationDecision {
            index: 3,
            op: OperationVerb::Replace,
            path: OperationPath::new("/accessToken/claims/email"),
            admitted: true,
        };

        let event = AuditEvent::from_decision("inv-1", ActionType::PreIssueAccessToken, &decision);

        assert_eq!(event.outcome(), AuditOutcome::Admitted);
        assert_eq!(event.index(), 3);
        assert_eq!(event.op(), OperationVerb::Replace);
        assert_eq!(event.path().as_str(), "/accessToken/claims/email");
    }

    #[test]
    fn display_lists_decision_fields() {
        let event = AuditEvent::new(
            "inv-9",
            ActionType::Authentication,
            1,
            OperationVerb::Remove,
            "/claims/aud",
            AuditOutcome::Rejected,
        );

        assert_eq!(
            event.to_string(),
            "AuditEvent[outcome=rejected, invocation_id=inv-9, action_type=authentication, \
             index=1, op=remove, path=/claims/aud]"
        );
    }
}
