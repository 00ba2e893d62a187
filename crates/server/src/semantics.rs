//! MCP `ToolAnnotations` derived from a tool's operation type.
//!
//! Every tool talks to Everhour, so `openWorldHint` is always `true`.

use crate::descriptor::OperationType;
use rmcp::model::ToolAnnotations;

#[must_use]
pub fn annotations_for_operation(operation: OperationType) -> ToolAnnotations {
    let open_world_hint = Some(true);

    match operation {
        OperationType::Read => ToolAnnotations {
            title: None,
            read_only_hint: Some(true),
            destructive_hint: Some(false),
            idempotent_hint: Some(true),
            open_world_hint,
        },
        // Creates, updates, timer starts/stops: mixed idempotency, so don't claim it.
        OperationType::Write => ToolAnnotations {
            title: None,
            read_only_hint: Some(false),
            destructive_hint: Some(false),
            idempotent_hint: None,
            open_world_hint,
        },
        OperationType::Delete => ToolAnnotations {
            title: None,
            read_only_hint: Some(false),
            destructive_hint: Some(true),
            idempotent_hint: Some(true),
            open_world_hint,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::annotations_for_operation;
    use crate::descriptor::OperationType;

    #[test]
    fn read_is_read_only_and_idempotent() {
        let a = annotations_for_operation(OperationType::Read);
        assert_eq!(a.read_only_hint, Some(true));
        assert_eq!(a.destructive_hint, Some(false));
        assert_eq!(a.idempotent_hint, Some(true));
        assert_eq!(a.open_world_hint, Some(true));
    }

    #[test]
    fn write_leaves_idempotency_unset() {
        let a = annotations_for_operation(OperationType::Write);
        assert_eq!(a.read_only_hint, Some(false));
        assert_eq!(a.idempotent_hint, None);
    }

    #[test]
    fn delete_is_destructive() {
        let a = annotations_for_operation(OperationType::Delete);
        assert_eq!(a.destructive_hint, Some(true));
        assert_eq!(a.idempotent_hint, Some(true));
    }
}
