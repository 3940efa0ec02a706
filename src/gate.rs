use crate::operation::{
    AllowedOperation, OperationPath, OperationVerb, PathScope, PerformableOperation,
};

/// Returns `true` if `allowed` authorizes `proposed`.
///
/// Coverage holds when:
/// - both verbs are equal and neither is [`OperationVerb::Unsupported`], and
/// - the proposed path matches under the allowed operation's scope:
///   - [`PathScope::Exact`]: the paths are equal byte for byte,
///   - [`PathScope::Children`]: the proposed path is a direct child of the
///     allowed path (see [`OperationPath::is_direct_child_of`]).
///
/// The proposed value never takes part in the decision. The function is pure
/// and total.
///
/// # Examples
///
/// ```
/// use action_gate::{covers, AllowedOperation, OperationVerb, PerformableOperation};
/// use serde_json::json;
///
/// let allowed = AllowedOperation::exact(OperationVerb::Replace, "/claims/email");
///
/// assert!(covers(
///     &allowed,
///     &PerformableOperation::new(OperationVerb::Replace, "/claims/email", json!("x@y.com")),
/// ));
/// assert!(!covers(
///     &allowed,
///     &PerformableOperation::new(OperationVerb::Add, "/claims/email", json!("x@y.com")),
/// ));
/// ```
pub fn covers(allowed: &AllowedOperation, proposed: &PerformableOperation) -> bool {
    if allowed.op != proposed.op || proposed.op == OperationVerb::Unsupported {
        return false;
    }

    path_matches(allowed.scope, &allowed.path, &proposed.path)
}

fn path_matches(scope: PathScope, allowed: &OperationPath, proposed: &OperationPath) -> bool {
    match scope {
        PathScope::Exact => allowed == proposed,
        PathScope::Children => proposed.is_direct_child_of(allowed),
    }
}

/// The decision taken for one proposed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDecision {
    /// Position of the operation in the action's response
    pub index: usize,
    /// Proposed verb
    pub op: OperationVerb,
    /// Proposed path
    pub path: OperationPath,
    /// Whether some allowed operation covered it
    pub admitted: bool,
}

/// Result of passing an action's proposals through an [`OperationGate`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Covered operations, in the order the action proposed them
    pub admitted: Vec<PerformableOperation>,
    /// One decision per proposed operation, in proposal order
    pub decisions: Vec<OperationDecision>,
}

impl FilterOutcome {
    /// Number of operations that were dropped.
    pub fn rejected_count(&self) -> usize {
        self.decisions.iter().filter(|d| !d.admitted).count()
    }
}

/// The authorization filter between an action's proposals and the
/// response processor.
///
/// A gate borrows the allowed operations declared for one invocation and
/// admits a proposed operation iff at least one of them covers it.
/// Admission is a boolean: an operation covered by several allowed
/// operations is admitted once.
///
/// # Examples
///
/// ```
/// use action_gate::{AllowedOperation, OperationGate, OperationVerb, PerformableOperation};
/// use serde_json::json;
///
/// let allowed = [AllowedOperation::exact(OperationVerb::Replace, "/claims/email")];
/// let outcome = OperationGate::new(&allowed).filter(vec![
///     PerformableOperation::new(OperationVerb::Replace, "/claims/email", json!("x@y.com")),
///     PerformableOperation::new(OperationVerb::Add, "/claims/role", json!("admin")),
/// ]);
///
/// assert_eq!(outcome.admitted.len(), 1);
/// assert_eq!(outcome.rejected_count(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OperationGate<'a> {
    allowed: &'a [AllowedOperation],
}

impl<'a> OperationGate<'a> {
    /// Creates a gate over the allowed operations of one invocation.
    pub fn new(allowed: &'a [AllowedOperation]) -> Self {
        Self { allowed }
    }

    /// Returns `true` if any allowed operation covers `proposed`.
    pub fn admits(&self, proposed: &PerformableOperation) -> bool {
        self.allowed.iter().any(|allowed| covers(allowed, proposed))
    }

    /// Splits `proposed` into the admitted subset and a per-operation record.
    ///
    /// Never fails: uncovered operations are dropped, not reported as errors.
    pub fn filter(&self, proposed: Vec<PerformableOperation>) -> FilterOutcome {
        let mut admitted = Vec::with_capacity(proposed.len());
        let mut decisions = Vec::with_capacity(proposed.len());

        for (index, operation) in proposed.into_iter().enumerate() {
            let is_admitted = self.admits(&operation);
            decisions.push(OperationDecision {
                index,
                op: operation.op,
                path: operation.path.clone(),
                admitted: is_admitted,
            });
            if is_admitted {
                admitted.push(operation);
            }
        }

        FilterOutcome {
            admitted,
            decisions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn replace(path: &str, value: &str) -> PerformableOperation {
        PerformableOperation::new(OperationVerb::Replace, path, json!(value))
    }

    fn add(path: &str, value: &str) -> PerformableOperation {
        PerformableOperation::new(OperationVerb::Add, path, json!(value))
    }

    #[test]
    fn exact_scope_requires_equal_verb_and_path() {
        let allowed = AllowedOperation::exact(OperationVerb::Replace, "/claims/email");

        assert!(covers(&allowed, &replace("/claims/email", "x@y.com")));
        assert!(!covers(&allowed, &add("/claims/email", "x@y.com")));
        assert!(!covers(&allowed, &replace("/claims/Email", "x@y.com")));
        assert!(!covers(&allowed, &replace("/claims/email/", "x@y.com")));
    }

    #[test]
    fn children_scope_covers_direct_children_only() {
        let allowed = AllowedOperation::children(OperationVerb::Add, "/accessToken/claims/");

        assert!(covers(&allowed, &add("/accessToken/claims/role", "admin")));
        assert!(!covers(&allowed, &add("/accessToken/claims/", "admin")));
        assert!(!covers(&allowed, &add("/accessToken/claims/a/b", "admin")));
        assert!(!covers(&allowed, &add("/accessToken/scopes/x", "admin")));
    }

    #[test]
    fn unsupported_verb_is_never_covered() {
        let allowed = AllowedOperation::exact(OperationVerb::Unsupported, "/claims/role");
        let proposed = PerformableOperation {
            op: OperationVerb::Unsupported,
            path: "/claims/role".into(),
            value: None,
        };

        assert!(!covers(&allowed, &proposed));
    }

    #[test]
    fn value_does_not_affect_coverage() {
        let allowed = AllowedOperation::exact(OperationVerb::Replace, "/claims/email");

        assert!(covers(&allowed, &replace("/claims/email", "a")));
        assert!(covers(&allowed, &replace("/claims/email", "b")));
    }

    #[test]
    fn empty_allow_list_admits_nothing() {
        let outcome = OperationGate::new(&[]).filter(vec![add("/claims/role", "admin")]);

        assert!(outcome.admitted.is_empty());
        assert_eq!(outcome.decisions.len(), 1);
        assert!(!outcome.decisions[0].admitted);
    }

    #[test]
    fn duplicate_allowed_operations_do_not_duplicate_admission() {
        let allowed = [
            AllowedOperation::exact(OperationVerb::Add, "/claims/role"),
            AllowedOperation::exact(OperationVerb::Add, "/claims/role"),
            AllowedOperation::children(OperationVerb::Add, "/claims"),
        ];

        let outcome = OperationGate::new(&allowed).filter(vec![add("/claims/role", "admin")]);

        assert_eq!(outcome.admitted, vec![add("/claims/role", "admin")]);
    }

    #[test]
    fn filter_preserves_proposal_order() {
        let allowed = [
            AllowedOperation::exact(OperationVerb::Add, "/claims/b"),
            AllowedOperation::exact(OperationVerb::Add, "/claims/a"),
        ];
        let proposed = vec![
            add("/claims/a", "1"),
            add("/claims/x", "2"),
            add("/claims/b", "3"),
            add("/claims/a", "4"),
        ];

        let outcome = OperationGate::new(&allowed).filter(proposed);

        assert_eq!(
            outcome.admitted,
            vec![add("/claims/a", "1"), add("/claims/b", "3"), add("/claims/a", "4")]
        );
        let flags: Vec<_> = outcome.decisions.iter().map(|d| d.admitted).collect();
        assert_eq!(flags, vec![true, false, true, true]);
        assert_eq!(outcome.rejected_count(), 1);
    }

    #[test]
    fn decisions_carry_original_index() {
        let allowed = [AllowedOperation::exact(OperationVerb::Remove, "/claims/aud")];
        let outcome = OperationGate::new(&allowed).filter(vec![
            add("/claims/x", "1"),
            PerformableOperation::remove("/claims/aud"),
        ]);

        assert_eq!(outcome.decisions[1].index, 1);
        assert_eq!(outcome.decisions[1].path.as_str(), "/claims/aud");
        assert!(outcome.decisions[1].admitted);
    }
}
