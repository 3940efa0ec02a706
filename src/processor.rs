use std::sync::Mutex;

use crate::error::ProcessingError;
use crate::operation::PerformableOperation;
use crate::request::{ActionExecutionRequest, ActionType, EventContext};
use crate::response::ActionExecutionResponse;

/// Applies an action's admitted operations for one action type.
///
/// The response handed to `process` has already been filtered. Its
/// operation list is authoritative and final: implementations must not look
/// for, or re-admit, operations that were dropped.
pub trait ResponseProcessor: Send + Sync {
    /// Applies `response` to the live `event_context`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingError::Failed`] if the operations cannot be
    /// applied. The failure reaches the executor's caller unchanged.
    fn process(
        &self,
        action_type: ActionType,
        event_context: &mut EventContext,
        request: &ActionExecutionRequest,
        response: &ActionExecutionResponse,
    ) -> Result<(), ProcessingError>;
}

/// A processor that records the operations it receives.
///
/// `RecordingProcessor` leaves the event context untouched and keeps one
/// entry per call, in call order. Configure it with
/// [`failing_with`](Self::failing_with) to simulate a processor failure.
///
/// # Examples
///
/// ```
/// use action_gate::RecordingProcessor;
///
/// let processor = RecordingProcessor::new();
/// assert!(processor.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct RecordingProcessor {
    received: Mutex<Vec<Vec<PerformableOperation>>>,
    failure: Option<String>,
}

impl RecordingProcessor {
    /// Creates a processor that accepts every response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a processor that records, then fails with `message`.
    pub fn failing_with(message: impl Into<String>) -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    /// Returns the operation lists received so far, oldest first.
    pub fn received(&self) -> Vec<Vec<PerformableOperation>> {
        self.lock().clone()
    }

    /// Returns the number of responses processed.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been processed.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<PerformableOperation>>> {
        self.received
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ResponseProcessor for RecordingProcessor {
    fn process(
        &self,
        action_type: ActionType,
        _event_context: &mut EventContext,
        _request: &ActionExecutionRequest,
        response: &ActionExecutionResponse,
    ) -> Result<(), ProcessingError> {
        self.lock().push(response.operations().to_vec());

        match &self.failure {
            Some(message) => Err(ProcessingError::Failed {
                action_type,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}
