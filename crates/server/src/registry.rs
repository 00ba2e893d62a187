//! The merged, immutable set of tools.

use crate::descriptor::ToolDescriptor;
use crate::error::DispatchError;
use rmcp::model::Tool;
use std::collections::HashMap;
use tracing::warn;

/// Name → descriptor, in group merge order.
#[derive(Debug, Default)]
pub struct Registry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<&'static str, usize>,
    collisions: Vec<&'static str>,
}

impl Registry {
    /// Merge descriptor groups in order. A later descriptor replaces an earlier one with the
    /// same name (keeping the earlier position); each collision is logged and recorded.
    #[must_use]
    pub fn from_groups<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = Vec<ToolDescriptor>>,
    {
        let mut registry = Self::default();
        for descriptor in groups.into_iter().flatten() {
            registry.insert(descriptor);
        }
        registry
    }

    /// Every built-in Everhour tool.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_groups(crate::tools::all_groups())
    }

    fn insert(&mut self, descriptor: ToolDescriptor) {
        if let Some(e) = descriptor.schema_error() {
            warn!(tool = descriptor.name, error = e, "input schema does not compile");
        }
        if let Some(&pos) = self.index.get(descriptor.name) {
            warn!(tool = descriptor.name, "duplicate tool name; later definition wins");
            self.collisions.push(descriptor.name);
            self.tools[pos] = descriptor;
        } else {
            self.index.insert(descriptor.name, self.tools.len());
            self.tools.push(descriptor);
        }
    }

    /// MCP discovery listing.
    #[must_use]
    pub fn list(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolDescriptor::to_tool).collect()
    }

    /// # Errors
    ///
    /// Returns [`DispatchError::ToolNotFound`] for unknown names.
    pub fn resolve(&self, name: &str) -> Result<&ToolDescriptor, DispatchError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| DispatchError::ToolNotFound(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Names that were defined more than once while merging.
    #[must_use]
    pub fn collisions(&self) -> &[&'static str] {
        &self.collisions
    }

    /// Tools whose input schema failed to compile, with the compile error.
    #[must_use]
    pub fn schema_errors(&self) -> Vec<(&'static str, &str)> {
        self.tools
            .iter()
            .filter_map(|d| d.schema_error().map(|e| (d.name, e)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{OperationType, ToolResult};
    use everhour_api::Gateway;
    use futures::future::BoxFuture;
    use rmcp::model::CallToolResult;
    use serde_json::{Value, json};

    fn noop(_: &Gateway, _: Value) -> BoxFuture<'_, ToolResult> {
        Box::pin(async { Ok(CallToolResult::success(vec![])) })
    }

    fn read(name: &'static str, description: &'static str) -> ToolDescriptor {
        ToolDescriptor::read(name, description, &["things"], json!({"type": "object"}), noop)
            .readonly()
    }

    #[test]
    fn merge_keeps_group_order() {
        let r = Registry::from_groups([vec![read("a", ""), read("b", "")], vec![read("c", "")]]);
        let names: Vec<_> = r.iter().map(|d| d.name).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(r.collisions().is_empty());
    }

    #[test]
    fn later_group_overwrites_on_collision() {
        let later = ToolDescriptor::delete("a", "second", &["things"], json!({}), noop);
        let r = Registry::from_groups([vec![read("a", "first"), read("b", "")], vec![later]]);
        assert_eq!(r.len(), 2);
        let a = r.resolve("a").expect("a");
        assert_eq!(a.description, "second");
        assert_eq!(a.operation, OperationType::Delete);
        assert_eq!(r.iter().next().map(|d| d.name), Some("a"));
        assert_eq!(r.collisions(), ["a"]);
    }

    #[test]
    fn resolve_unknown_is_not_found() {
        let r = Registry::from_groups([vec![read("a", "")]]);
        let err = r.resolve("nope").unwrap_err();
        assert_eq!(err.to_string(), "Tool \"nope\" not found");
    }

    #[test]
    fn schema_errors_are_collected() {
        let broken = ToolDescriptor::read(
            "broken",
            "",
            &["things"],
            json!({"type": "object", "properties": {"id": {"type": 12}}}),
            noop,
        );
        let r = Registry::from_groups([vec![read("a", ""), broken]]);
        let errors = r.schema_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "broken");
    }

    #[test]
    fn builtin_registry_has_unique_names() {
        let r = Registry::builtin();
        assert!(r.collisions().is_empty(), "{:?}", r.collisions());
        assert!(r.schema_errors().is_empty(), "{:?}", r.schema_errors());
        assert!(r.len() > 60);
        assert!(r.iter().all(|d| d.name.starts_with("everhour_")));
    }

    #[test]
    fn builtin_read_tools_opt_into_restricted_mode() {
        for d in Registry::builtin().iter() {
            assert!(d.validator().is_ok(), "{} schema does not compile", d.name);
            assert_eq!(
                d.readonly,
                d.operation == OperationType::Read,
                "{} declares readonly={} for {}",
                d.name,
                d.readonly,
                d.operation
            );
            assert!(!d.resources.is_empty(), "{} has no resources", d.name);
            assert_eq!(
                d.input_schema.get("type"),
                Some(&json!("object")),
                "{} schema",
                d.name
            );
        }
    }
}
