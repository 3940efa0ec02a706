use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::operation::AllowedOperation;

/// The live, caller-owned context of the event that triggered an action.
pub type EventContext = Map<String, Value>;

/// The extension points at which an action can be invoked.
///
/// The set is closed. Request builders and response processors are
/// registered per variant at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Runs before an access token is issued
    PreIssueAccessToken,
    /// Runs during authentication
    Authentication,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::PreIssueAccessToken => write!(f, "pre-issue-access-token"),
            ActionType::Authentication => write!(f, "authentication"),
        }
    }
}

/// The request sent to an action endpoint.
///
/// Pairs a snapshot of the triggering event with the operations the action
/// is allowed to perform. A request is immutable once built; fields are only
/// reachable through accessors.
///
/// # Examples
///
/// ```
/// use action_gate::{ActionExecutionRequest, ActionType, AllowedOperation, OperationVerb};
/// use serde_json::json;
///
/// let request = ActionExecutionRequest::builder(ActionType::PreIssueAccessToken, json!({}))
///     .allow(AllowedOperation::exact(OperationVerb::Replace, "/claims/email"))
///     .allow(AllowedOperation::exact(OperationVerb::Replace, "/claims/email"))
///     .build();
///
/// // the second declaration is deduplicated
/// assert_eq!(request.allowed_operations().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionExecutionRequest {
    action_type: ActionType,
    event: Value,
    allowed_operations: Vec<AllowedOperation>,
}

impl ActionExecutionRequest {
    /// Starts building a request for `action_type` carrying `event`.
    pub fn builder(action_type: ActionType, event: Value) -> ActionExecutionRequestBuilder {
        ActionExecutionRequestBuilder {
            action_type,
            event,
            allowed_operations: Vec::new(),
        }
    }

    /// Returns the action type this request was built for.
    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    /// Returns the event snapshot sent to the action.
    pub fn event(&self) -> &Value {
        &self.event
    }

    /// Returns the declared allowed operations in declaration order.
    pub fn allowed_operations(&self) -> &[AllowedOperation] {
        &self.allowed_operations
    }
}

/// Builder for [`ActionExecutionRequest`].
#[derive(Debug)]
pub struct ActionExecutionRequestBuilder {
    action_type: ActionType,
    event: Value,
    allowed_operations: Vec<AllowedOperation>,
}

impl ActionExecutionRequestBuilder {
    /// Declares an allowed operation, skipping structural duplicates.
    pub fn allow(mut self, allowed: AllowedOperation) -> Self {
        if !self.allowed_operations.contains(&allowed) {
            self.allowed_operations.push(allowed);
        }
        self
    }

    /// Declares every operation in `allowed`, in order.
    pub fn allow_all(self, allowed: impl IntoIterator<Item = AllowedOperation>) -> Self {
        allowed.into_iter().fold(self, Self::allow)
    }

    /// Finishes the request.
    pub fn build(self) -> ActionExecutionRequest {
        ActionExecutionRequest {
            action_type: self.action_type,
            event: self.event,
            allowed_operations: self.allowed_operations,
        }
    }
}
