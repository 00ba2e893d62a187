//! rmcp server handler: `tools/list` and `tools/call` over the dispatcher.

use crate::dispatch::Dispatcher;
use crate::error::DispatchError;
use rmcp::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ErrorCode, ErrorData, Implementation, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use serde_json::Value;

const INSTRUCTIONS: &str = "Everhour time tracking tools. Durations accept seconds or text like \
\"1h 30m\". In read-only mode only tools marked read-only can be called.";

#[derive(Clone)]
pub struct EverhourServer {
    dispatcher: Dispatcher,
}

impl EverhourServer {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

fn to_error_data(e: &DispatchError) -> ErrorData {
    match e {
        DispatchError::ToolNotFound(_) => {
            ErrorData::new(ErrorCode::METHOD_NOT_FOUND, e.to_string(), None)
        }
    }
}

impl ServerHandler for EverhourServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "everhour-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Everhour MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.dispatcher.registry().list(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let args = request.arguments.map_or(Value::Null, Value::Object);
        self.dispatcher
            .invoke(&request.name, args)
            .await
            .map_err(|e| to_error_data(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_method_not_found() {
        let data = to_error_data(&DispatchError::ToolNotFound("everhour_nope".into()));
        assert_eq!(data.code, ErrorCode::METHOD_NOT_FOUND);
        assert_eq!(data.message, "Tool \"everhour_nope\" not found");
    }
}
