use serde_json::{Map, Value};

use crate::error::RequestBuildError;
use crate::operation::AllowedOperation;
use crate::request::{ActionExecutionRequest, ActionType, EventContext};

/// Builds the execution request for one action type.
///
/// The builder is the trusted party that declares which operations the
/// remote action may perform. The executor does not second-guess the
/// declared list.
pub trait RequestBuilder: Send + Sync {
    /// Builds a request from the live event context.
    ///
    /// # Errors
    ///
    /// Returns [`RequestBuildError::Failed`] if the context lacks what the
    /// action type needs.
    fn build(
        &self,
        action_type: ActionType,
        event_context: &EventContext,
    ) -> Result<ActionExecutionRequest, RequestBuildError>;
}

/// A request builder with a fixed allow-list.
///
/// The event snapshot is a copy of the event context, optionally narrowed to
/// a set of keys. Keys listed with [`require_key`](Self::require_key) must
/// be present or the build fails.
///
/// # Examples
///
/// ```
/// use action_gate::{
///     ActionType, AllowedOperation, EventContext, OperationVerb, RequestBuilder,
///     StaticRequestBuilder,
/// };
/// use serde_json::json;
///
/// let builder = StaticRequestBuilder::new([
///     AllowedOperation::exact(OperationVerb::Replace, "/accessToken/claims/email"),
/// ])
/// .require_key("accessToken");
///
/// let mut context = EventContext::new();
/// context.insert("accessToken".to_string(), json!({"claims": {}}));
///
/// let request = builder.build(ActionType::PreIssueAccessToken, &context).unwrap();
/// assert_eq!(request.allowed_operations().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticRequestBuilder {
    allowed: Vec<AllowedOperation>,
    event_keys: Option<Vec<String>>,
    required_keys: Vec<String>,
}

impl StaticRequestBuilder {
    /// Creates a builder declaring `allowed` on every request.
    pub fn new(allowed: impl IntoIterator<Item = AllowedOperation>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
            event_keys: None,
            required_keys: Vec::new(),
        }
    }

    /// Limits the event snapshot to the given context keys.
    pub fn with_event_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.event_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Fails the build when `key` is missing from the event context.
    pub fn require_key(mut self, key: impl Into<String>) -> Self {
        self.required_keys.push(key.into());
        self
    }

    fn snapshot(&self, event_context: &EventContext) -> Value {
        match &self.event_keys {
            None => Value::Object(event_context.clone()),
            Some(keys) => Value::Object(
                keys.iter()
                    .filter_map(|key| {
                        event_context
                            .get(key)
                            .map(|value| (key.clone(), value.clone()))
                    })
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl RequestBuilder for StaticRequestBuilder {
    fn build(
        &self,
        action_type: ActionType,
        event_context: &EventContext,
    ) -> Result<ActionExecutionRequest, RequestBuildError> {
        if let Some(missing) = self
            .required_keys
            .iter()
            .find(|key| !event_context.contains_key(key.as_str()))
        {
            return Err(RequestBuildError::Failed {
                action_type,
                message: format!("event context is missing '{missing}'"),
            });
        }

        Ok(
            ActionExecutionRequest::builder(action_type, self.snapshot(event_context))
                .allow_all(self.allowed.iter().cloned())
                .build(),
        )
    }
}
