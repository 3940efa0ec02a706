//! Authorization filter for externally hosted token-issuance actions.
//!
//! At a defined point of access-token issuance (for example right before a
//! token is issued) the issuer calls an external *action*. The action may
//! propose modifications to the in-flight token, but it is untrusted with
//! respect to what it may change. This crate:
//!
//! - **Declares** what the action may touch: the request builder attaches a
//!   list of [`AllowedOperation`]s to every [`ActionExecutionRequest`]
//! - **Dispatches** the request through an [`ActionDispatcher`]
//! - **Filters** the action's [`PerformableOperation`]s through an
//!   [`OperationGate`], keeping only those some allowed operation
//!   [`covers`]
//! - **Audits** every admit/reject decision
//! - **Hands off** the admitted subset to a [`ResponseProcessor`]
//!
//! # Coverage Rule
//!
//! An allowed operation covers a proposed one when the verbs are equal and
//! the paths match under the allowed operation's [`PathScope`]: equal paths
//! for `exact`, direct children for `children`. Values are never compared.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use action_gate::{
//!     ActionEndpoint, ActionExecutionResponse, ActionExecutor, ActionType, AllowedOperation,
//!     EventContext, OperationVerb, PerformableOperation, RecordingProcessor,
//!     StaticRequestBuilder, StubDispatcher,
//! };
//! use serde_json::json;
//!
//! let action = StubDispatcher::responding(ActionExecutionResponse::new(vec![
//!     PerformableOperation::new(OperationVerb::Add, "/accessToken/claims/role", json!("admin")),
//! ]));
//!
//! let executor = ActionExecutor::builder(
//!     ActionEndpoint::parse("https://actions.example.com/pre-issue").unwrap(),
//!     Arc::new(action),
//! )
//! .request_builder(ActionType::PreIssueAccessToken, Arc::new(StaticRequestBuilder::default()))
//! .response_processor(ActionType::PreIssueAccessToken, Arc::new(RecordingProcessor::new()))
//! .build();
//!
//! // Nothing was allowed, so nothing is admitted.
//! let response = executor
//!     .execute(ActionType::PreIssueAccessToken, &mut EventContext::new())
//!     .expect("invocation succeeds");
//! assert!(response.operations().is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod builder;
mod config;
mod dispatch;
mod error;
mod executor;
mod gate;
mod logging;
mod operation;
mod processor;
mod registry;
mod request;
mod response;
mod secret;

pub use builder::{RequestBuilder, StaticRequestBuilder};
pub use config::{ActionEndpoint, DispatchConfig, EndpointAuth};
pub use dispatch::{ActionDispatcher, DispatchError, DispatchRecord, HttpDispatcher, StubDispatcher};
pub use error::{
    ActionErrorKind, ActionExecutionError, ConfigError, ProcessingError, RequestBuildError,
};
pub use executor::{ActionExecutor, ActionExecutorBuilder};
pub use gate::{covers, FilterOutcome, OperationDecision, OperationGate};
pub use operation::{
    AllowedOperation, OperationPath, OperationVerb, PathScope, PerformableOperation,
};
pub use processor::{RecordingProcessor, ResponseProcessor};
pub use registry::Registry;
pub use request::{ActionExecutionRequest, ActionExecutionRequestBuilder, ActionType, EventContext};
pub use response::ActionExecutionResponse;
pub use secret::Secret;
