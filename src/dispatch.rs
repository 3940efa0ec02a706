//! The boundary between the executor and the remote action.
//!
//! This module provides:
//! - `ActionDispatcher`: the call contract the executor depends on
//! - `HttpDispatcher`: blocking HTTP implementation
//! - `StubDispatcher`: offline implementation that records calls
//!
//! A dispatcher performs exactly one call per invocation. Retries, backoff
//! and circuit breaking are not part of this contract; a surrounding system
//! that wants them wraps a dispatcher.

mod http;
mod stub;

pub use http::HttpDispatcher;
pub use stub::{DispatchRecord, StubDispatcher};

use thiserror::Error;

use crate::config::ActionEndpoint;
use crate::request::ActionExecutionRequest;
use crate::response::ActionExecutionResponse;

/// Failure to obtain a response from an action endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The endpoint could not be reached, or the call timed out
    #[error("transport error: {message}")]
    Transport {
        /// Transport-supplied reason
        message: String,
    },
    /// The endpoint answered with a non-success status
    #[error("action endpoint returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },
    /// The response body could not be decoded into a response
    #[error("malformed response body: {message}")]
    MalformedBody {
        /// Decoder-supplied reason
        message: String,
    },
}

/// Sends an execution request to an action endpoint.
///
/// Implementations block the calling thread until a response or an error is
/// available. They are shared across concurrent invocations.
pub trait ActionDispatcher: Send + Sync {
    /// Calls the action at `endpoint` with `request`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the endpoint is unreachable, answers with
    /// a non-success status, or returns a body that does not decode.
    fn call(
        &self,
        endpoint: &ActionEndpoint,
        request: &ActionExecutionRequest,
    ) -> Result<ActionExecutionResponse, DispatchError>;
}
