//! Tool descriptors: the static contract of one tool.

use crate::error::ToolError;
use crate::semantics::annotations_for_operation;
use everhour_api::Gateway;
use futures::future::BoxFuture;
use jsonschema::Validator;
use rmcp::model::{CallToolResult, JsonObject, Tool};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub type ToolResult = Result<CallToolResult, ToolError>;

/// Tool entry point. Receives the gateway and the already schema-checked arguments.
pub type Handler = for<'a> fn(&'a Gateway, Value) -> BoxFuture<'a, ToolResult>;

/// Coarse classification of what a tool does upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Read,
    Write,
    Delete,
}

impl OperationType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub operation: OperationType,
    /// Explicit opt-in to restricted mode, set with [`ToolDescriptor::readonly`]. Only
    /// meaningful together with [`OperationType::Read`].
    pub readonly: bool,
    pub resources: &'static [&'static str],
    pub input_schema: Arc<JsonObject>,
    /// `input_schema` compiled once at construction, or why it would not compile.
    validator: Result<Arc<Validator>, String>,
    pub handler: Handler,
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("operation", &self.operation)
            .field("readonly", &self.readonly)
            .field("resources", &self.resources)
            .field("schema_error", &self.schema_error())
            .finish_non_exhaustive()
    }
}

impl ToolDescriptor {
    fn new(
        name: &'static str,
        description: &'static str,
        operation: OperationType,
        resources: &'static [&'static str],
        input_schema: Value,
        handler: Handler,
    ) -> Self {
        let validator = jsonschema::validator_for(&input_schema)
            .map(Arc::new)
            .map_err(|e| e.to_string());
        let input_schema = match input_schema {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        };
        Self {
            name,
            description,
            operation,
            readonly: false,
            resources,
            input_schema: Arc::new(input_schema),
            validator,
            handler,
        }
    }

    /// A read tool. It stays blocked in restricted mode unless it also opts in with
    /// [`ToolDescriptor::readonly`].
    #[must_use]
    pub fn read(
        name: &'static str,
        description: &'static str,
        resources: &'static [&'static str],
        input_schema: Value,
        handler: Handler,
    ) -> Self {
        Self::new(name, description, OperationType::Read, resources, input_schema, handler)
    }

    #[must_use]
    pub fn write(
        name: &'static str,
        description: &'static str,
        resources: &'static [&'static str],
        input_schema: Value,
        handler: Handler,
    ) -> Self {
        Self::new(name, description, OperationType::Write, resources, input_schema, handler)
    }

    #[must_use]
    pub fn delete(
        name: &'static str,
        description: &'static str,
        resources: &'static [&'static str],
        input_schema: Value,
        handler: Handler,
    ) -> Self {
        Self::new(name, description, OperationType::Delete, resources, input_schema, handler)
    }

    /// Declare the tool safe to run in restricted mode.
    #[must_use]
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// The compiled input schema.
    ///
    /// # Errors
    ///
    /// Returns the compile error if the declared schema is not a valid JSON Schema.
    pub fn validator(&self) -> Result<&Validator, &str> {
        self.validator.as_deref().map_err(String::as_str)
    }

    #[must_use]
    pub fn schema_error(&self) -> Option<&str> {
        self.validator.as_ref().err().map(String::as_str)
    }

    /// MCP discovery view of this tool.
    #[must_use]
    pub fn to_tool(&self) -> Tool {
        let mut tool = Tool::new(self.name, self.description, self.input_schema.clone());
        tool.annotations = Some(annotations_for_operation(self.operation));
        tool
    }
}

/// Deserialize validated arguments into a tool's typed parameter struct.
///
/// # Errors
///
/// Returns [`ToolError::Validation`] when the arguments do not fit `T`.
pub fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        Value::Object(JsonObject::new())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolError::validation(format!("Invalid params: {e}")))
}
