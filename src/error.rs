use std::fmt;

use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::request::ActionType;

/// Failure to obtain an execution request for an action type.
#[derive(Debug, Error)]
pub enum RequestBuildError {
    /// No request builder is registered for the action type
    #[error("no request builder registered for action type '{action_type}'")]
    NoBuilder {
        /// The action type that was requested
        action_type: ActionType,
    },
    /// The registered builder could not produce a request
    #[error("request builder for '{action_type}' failed: {message}")]
    Failed {
        /// The action type being built
        action_type: ActionType,
        /// Builder-supplied reason
        message: String,
    },
}

/// Failure while applying admitted operations.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// No response processor is registered for the action type
    #[error("no response processor registered for action type '{action_type}'")]
    NoProcessor {
        /// The action type that was requested
        action_type: ActionType,
    },
    /// The registered processor rejected or failed to apply the response
    #[error("response processor for '{action_type}' failed: {message}")]
    Failed {
        /// The action type being processed
        action_type: ActionType,
        /// Processor-supplied reason
        message: String,
    },
}

/// Invalid dispatch configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The endpoint is not an absolute http(s) URL
    #[error("invalid action endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The rejected endpoint text
        endpoint: String,
        /// Why it was rejected
        reason: String,
    },
    /// An API key header name is not a valid HTTP header name
    #[error("invalid auth header name '{header}'")]
    InvalidHeader {
        /// The rejected header name
        header: String,
    },
    /// An API key value cannot be sent as an HTTP header value
    #[error("invalid value for auth header '{header}'")]
    InvalidHeaderValue {
        /// The header the value was meant for
        header: String,
    },
    /// The HTTP client could not be initialized
    #[error("failed to initialize HTTP client: {message}")]
    HttpClient {
        /// Client-supplied reason
        message: String,
    },
    /// The configuration document could not be decoded
    #[error("malformed dispatch configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The single failure type returned by
/// [`ActionExecutor::execute`](crate::ActionExecutor::execute).
#[derive(Debug, Error)]
pub enum ActionExecutionError {
    /// No request could be built; nothing was sent
    #[error(transparent)]
    RequestBuild(#[from] RequestBuildError),
    /// The action could not be reached or answered with a non-success status
    #[error("action dispatch failed: {0}")]
    Dispatch(#[source] DispatchError),
    /// The request could not be encoded or the response body decoded
    #[error("action payload could not be (de)serialized: {message}")]
    Serialization {
        /// Codec-supplied reason
        message: String,
    },
    /// The response processor failed after filtering completed
    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

impl ActionExecutionError {
    /// Returns the category of this failure.
    pub fn kind(&self) -> ActionErrorKind {
        match self {
            ActionExecutionError::RequestBuild(_) => ActionErrorKind::RequestBuild,
            ActionExecutionError::Dispatch(_) => ActionErrorKind::Dispatch,
            ActionExecutionError::Serialization { .. } => ActionErrorKind::Serialization,
            ActionExecutionError::Processing(_) => ActionErrorKind::Processing,
        }
    }
}

impl From<DispatchError> for ActionExecutionError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::MalformedBody { message } => {
                ActionExecutionError::Serialization { message }
            }
            other => ActionExecutionError::Dispatch(other),
        }
    }
}

/// Category of an [`ActionExecutionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionErrorKind {
    /// Request construction failed
    RequestBuild,
    /// Transport or status failure
    Dispatch,
    /// Payload encoding or decoding failed
    Serialization,
    /// Response processing failed
    Processing,
}

impl fmt::Display for ActionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionErrorKind::RequestBuild => write!(f, "request_build"),
            ActionErrorKind::Dispatch => write!(f, "dispatch"),
            ActionErrorKind::Serialization => write!(f, "serialization"),
            ActionErrorKind::Processing => write!(f, "processing"),
        }
    }
}
