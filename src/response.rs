use serde::{Deserialize, Serialize};

use crate::operation::PerformableOperation;

/// The response returned by an action endpoint.
///
/// As received, `operations` holds whatever the action proposed. The
/// executor replaces that list in place with the admitted subset before the
/// response reaches a [`ResponseProcessor`](crate::ResponseProcessor).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionExecutionResponse {
    #[serde(default)]
    operations: Vec<PerformableOperation>,
}

impl ActionExecutionResponse {
    /// Creates a response proposing `operations`.
    pub fn new(operations: Vec<PerformableOperation>) -> Self {
        Self { operations }
    }

    /// Returns the operations currently carried by the response.
    pub fn operations(&self) -> &[PerformableOperation] {
        &self.operations
    }

    /// Swaps the operation list, returning the previous one.
    pub fn replace_operations(
        &mut self,
        operations: Vec<PerformableOperation>,
    ) -> Vec<PerformableOperation> {
        std::mem::replace(&mut self.operations, operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::OperationVerb;
    use serde_json::json;

    #[test]
    fn missing_operations_field_means_empty() {
        let response: ActionExecutionResponse =
            serde_json::from_value(json!({"actionStatus": "SUCCESS"})).unwrap();
        assert!(response.operations().is_empty());
    }

    #[test]
    fn decodes_proposed_operations_in_order() {
        let response: ActionExecutionResponse = serde_json::from_value(json!({
            "operations": [
                {"op": "replace", "path": "/claims/email", "value": "x@y.com"},
                {"op": "remove", "path": "/claims/aud/1"}
            ]
        }))
        .unwrap();

        let ops = response.operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].op, OperationVerb::Replace);
        assert_eq!(ops[0].value, Some(json!("x@y.com")));
        assert_eq!(ops[1].op, OperationVerb::Remove);
    }

    #[test]
    fn replace_operations_returns_previous_list() {
        let original = vec![PerformableOperation::remove("/claims/a")];
        let mut response = ActionExecutionResponse::new(original.clone());

        let previous = response.replace_operations(Vec::new());

        assert_eq!(previous, original);
        assert!(response.operations().is_empty());
    }
}
