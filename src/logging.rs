use std::fmt;

use crate::request::ActionType;

/// Logger bound to one invocation.
///
/// Every message carries the invocation id and action type as structured
/// fields. Callers log counts and identifiers only; operation values and the
/// event snapshot stay out of the log.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InvocationLog<'a> {
    invocation_id: &'a str,
    action_type: ActionType,
}

impl<'a> InvocationLog<'a> {
    pub(crate) fn new(invocation_id: &'a str, action_type: ActionType) -> Self {
        Self {
            invocation_id,
            action_type,
        }
    }

    pub(crate) fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(
            invocation_id = %self.invocation_id,
            action_type = %self.action_type,
            "{}",
            args
        );
    }

    pub(crate) fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(
            invocation_id = %self.invocation_id,
            action_type = %self.action_type,
            "{}",
            args
        );
    }

    pub(crate) fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(
            invocation_id = %self.invocation_id,
            action_type = %self.action_type,
            "{}",
            args
        );
    }

    pub(crate) fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(
            invocation_id = %self.invocation_id,
            action_type = %self.action_type,
            "{}",
            args
        );
    }
}
