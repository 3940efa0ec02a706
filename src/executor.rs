use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::audit::{AuditEvent, AuditSink, TracingAuditSink};
use crate::builder::RequestBuilder;
use crate::config::{ActionEndpoint, DispatchConfig};
use crate::dispatch::{ActionDispatcher, HttpDispatcher};
use crate::error::{ActionExecutionError, ConfigError, ProcessingError, RequestBuildError};
use crate::gate::OperationGate;
use crate::logging::InvocationLog;
use crate::processor::ResponseProcessor;
use crate::registry::Registry;
use crate::request::{ActionType, EventContext};
use crate::response::ActionExecutionResponse;

/// Invokes an external action and admits only the operations it was
/// allowed to propose.
///
/// An executor is built once at startup and then shared, typically behind
/// an `Arc`, by every invocation. It holds no per-invocation state: each
/// call to [`execute`](Self::execute) builds its own request and response.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use action_gate::{
///     ActionEndpoint, ActionExecutionResponse, ActionExecutor, ActionType, AllowedOperation,
///     EventContext, OperationVerb, PerformableOperation, RecordingProcessor,
///     StaticRequestBuilder, StubDispatcher,
/// };
/// use serde_json::json;
///
/// let dispatcher = Arc::new(StubDispatcher::responding(ActionExecutionResponse::new(vec![
///     PerformableOperation::new(OperationVerb::Replace, "/claims/email", json!("x@y.com")),
///     PerformableOperation::new(OperationVerb::Add, "/claims/role", json!("admin")),
/// ])));
/// let processor = Arc::new(RecordingProcessor::new());
///
/// let executor = ActionExecutor::builder(
///     ActionEndpoint::parse("https://actions.example.com/pre-issue").unwrap(),
///     dispatcher,
/// )
/// .request_builder(
///     ActionType::PreIssueAccessToken,
///     Arc::new(StaticRequestBuilder::new([
///         AllowedOperation::exact(OperationVerb::Replace, "/claims/email"),
///     ])),
/// )
/// .response_processor(ActionType::PreIssueAccessToken, processor.clone())
/// .build();
///
/// let response = executor
///     .execute(ActionType::PreIssueAccessToken, &mut EventContext::new())
///     .unwrap();
///
/// assert_eq!(response.operations().len(), 1);
/// assert_eq!(processor.received()[0], response.operations());
/// ```
pub struct ActionExecutor {
    endpoint: ActionEndpoint,
    dispatcher: Arc<dyn ActionDispatcher>,
    builders: Registry<dyn RequestBuilder>,
    processors: Registry<dyn ResponseProcessor>,
    audit: Arc<dyn AuditSink>,
}

impl fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("endpoint", &self.endpoint.redacted())
            .field("builders", &self.builders)
            .field("processors", &self.processors)
            .finish_non_exhaustive()
    }
}

impl ActionExecutor {
    /// Starts building an executor that calls `endpoint` through `dispatcher`.
    pub fn builder(
        endpoint: ActionEndpoint,
        dispatcher: Arc<dyn ActionDispatcher>,
    ) -> ActionExecutorBuilder {
        ActionExecutorBuilder {
            endpoint,
            dispatcher,
            builders: Registry::new(),
            processors: Registry::new(),
            audit: None,
        }
    }

    /// Starts building an executor that calls the configured endpoint over
    /// HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the HTTP dispatcher cannot be created.
    pub fn http(config: &DispatchConfig) -> Result<ActionExecutorBuilder, ConfigError> {
        let dispatcher = HttpDispatcher::new(config)?;
        Ok(Self::builder(config.endpoint.clone(), Arc::new(dispatcher)))
    }

    /// Returns the endpoint every invocation is sent to.
    pub fn endpoint(&self) -> &ActionEndpoint {
        &self.endpoint
    }

    /// Returns `true` if both a request builder and a response processor
    /// are registered for `action_type`.
    pub fn supports(&self, action_type: ActionType) -> bool {
        self.builders.contains(action_type) && self.processors.contains(action_type)
    }

    /// Runs one invocation of the action registered for `action_type`.
    ///
    /// 1. Builds the request, declaring the allowed operations.
    /// 2. Calls the endpoint and waits for the response.
    /// 3. Keeps each proposed operation iff some allowed operation covers it,
    ///    preserving proposal order.
    /// 4. Replaces the response's operations with the admitted subset.
    /// 5. Records one audit event per proposed operation.
    /// 6. Hands the filtered response to the response processor.
    ///
    /// The builder and processor are both resolved before the endpoint is
    /// called, so a missing registration never costs a network round trip.
    ///
    /// # Errors
    ///
    /// - [`ActionExecutionError::RequestBuild`] if no builder is registered
    ///   or the builder fails
    /// - [`ActionExecutionError::Dispatch`] if the endpoint is unreachable or
    ///   answers with a non-success status
    /// - [`ActionExecutionError::Serialization`] if the response body does
    ///   not decode
    /// - [`ActionExecutionError::Processing`] if no processor is registered,
    ///   or the processor fails; in the latter case filtering has already
    ///   happened
    pub fn execute(
        &self,
        action_type: ActionType,
        event_context: &mut EventContext,
    ) -> Result<ActionExecutionResponse, ActionExecutionError> {
        let invocation_id = Uuid::new_v4().to_string();
        let log = InvocationLog::new(&invocation_id, action_type);

        let builder = self
            .builders
            .get(action_type)
            .ok_or(RequestBuildError::NoBuilder { action_type })?;
        let processor = self
            .processors
            .get(action_type)
            .ok_or(ProcessingError::NoProcessor { action_type })?;

        let request = builder.build(action_type, event_context).map_err(|error| {
            log.error(format_args!("request build failed: {error}"));
            error
        })?;

        log.debug(format_args!(
            "dispatching to {} with {} allowed operations",
            self.endpoint,
            request.allowed_operations().len()
        ));

        let mut response = self
            .dispatcher
            .call(&self.endpoint, &request)
            .map_err(|error| {
                log.error(format_args!("dispatch failed: {error}"));
                ActionExecutionError::from(error)
            })?;

        let proposed = response.replace_operations(Vec::new());
        let outcome = OperationGate::new(request.allowed_operations()).filter(proposed);

        for decision in &outcome.decisions {
            self.audit.record(&AuditEvent::from_decision(
                &invocation_id,
                action_type,
                decision,
            ));
        }

        let rejected = outcome.rejected_count();
        if rejected > 0 {
            log.warn(format_args!(
                "dropped {rejected} of {} proposed operations not covered by the allowed operations",
                outcome.decisions.len()
            ));
        }
        log.info(format_args!(
            "admitted {} of {} proposed operations",
            outcome.admitted.len(),
            outcome.decisions.len()
        ));

        response.replace_operations(outcome.admitted);

        processor
            .process(action_type, event_context, &request, &response)
            .map_err(|error| {
                log.error(format_args!("response processing failed: {error}"));
                error
            })?;

        Ok(response)
    }
}

/// Builder for [`ActionExecutor`].
pub struct ActionExecutorBuilder {
    endpoint: ActionEndpoint,
    dispatcher: Arc<dyn ActionDispatcher>,
    builders: Registry<dyn RequestBuilder>,
    processors: Registry<dyn ResponseProcessor>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl ActionExecutorBuilder {
    /// Registers the request builder for `action_type`.
    pub fn request_builder(
        mut self,
        action_type: ActionType,
        builder: Arc<dyn RequestBuilder>,
    ) -> Self {
        self.builders.register(action_type, builder);
        self
    }

    /// Registers the response processor for `action_type`.
    pub fn response_processor(
        mut self,
        action_type: ActionType,
        processor: Arc<dyn ResponseProcessor>,
    ) -> Self {
        self.processors.register(action_type, processor);
        self
    }

    /// Sends audit events to `sink` instead of [`TracingAuditSink`].
    pub fn audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Finishes the executor.
    pub fn build(self) -> ActionExecutor {
        ActionExecutor {
            endpoint: self.endpoint,
            dispatcher: self.dispatcher,
            builders: self.builders,
            processors: self.processors,
            audit: self
                .audit
                .unwrap_or_else(|| Arc::new(TracingAuditSink::new())),
        }
    }
}
