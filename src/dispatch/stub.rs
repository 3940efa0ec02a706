use std::sync::Mutex;

use super::{ActionDispatcher, DispatchError};
use crate::config::ActionEndpoint;
use crate::request::{ActionExecutionRequest, ActionType};
use crate::response::ActionExecutionResponse;

/// Metadata about one call made through a [`StubDispatcher`].
///
/// The event snapshot is deliberately not kept, so recorded calls never
/// retain user data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRecord {
    /// Endpoint the call was addressed to
    pub endpoint: String,
    /// Action type of the request
    pub action_type: ActionType,
    /// Number of allowed operations the request declared
    pub allowed_count: usize,
}

/// An offline dispatcher returning a canned outcome.
///
/// Every call is recorded and answered with a clone of the configured
/// response or error, without any network I/O. Useful for wiring an
/// [`ActionExecutor`](crate::ActionExecutor) in tests.
///
/// # Examples
///
/// ```
/// use action_gate::{
///     ActionDispatcher, ActionEndpoint, ActionExecutionRequest, ActionExecutionResponse,
///     ActionType, StubDispatcher,
/// };
/// use serde_json::json;
///
/// let stub = StubDispatcher::responding(ActionExecutionResponse::default());
/// let endpoint = ActionEndpoint::parse("https://actions.example.com").unwrap();
/// let request = ActionExecutionRequest::builder(ActionType::PreIssueAccessToken, json!({})).build();
///
/// stub.call(&endpoint, &request).unwrap();
/// assert_eq!(stub.call_count(), 1);
/// ```
#[derive(Debug)]
pub struct StubDispatcher {
    outcome: Result<ActionExecutionResponse, DispatchError>,
    calls: Mutex<Vec<DispatchRecord>>,
}

impl StubDispatcher {
    /// Creates a stub that answers every call with `response`.
    pub fn responding(response: ActionExecutionResponse) -> Self {
        Self {
            outcome: Ok(response),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a stub that fails every call with `error`.
    pub fn failing(error: DispatchError) -> Self {
        Self {
            outcome: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of the recorded calls, oldest first.
    pub fn calls(&self) -> Vec<DispatchRecord> {
        self.lock().clone()
    }

    /// Returns the number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DispatchRecord>> {
        // a poisoned record list is still a valid list
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ActionDispatcher for StubDispatcher {
    fn call(
        &self,
        endpoint: &ActionEndpoint,
        request: &ActionExecutionRequest,
    ) -> Result<ActionExecutionResponse, DispatchError> {
        self.lock().push(DispatchRecord {
            endpoint: endpoint.as_str().to_string(),
            action_type: request.action_type(),
            allowed_count: request.allowed_operations().len(),
        });
        self.outcome.clone()
    }
}
