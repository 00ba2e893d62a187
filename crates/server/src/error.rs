//! Error types for the MCP server.

use everhour_api::ApiError;
use everhour_api::duration::FormatError;
use serde_json::Value;
use thiserror::Error;

/// Failure inside one tool invocation. Always rendered as an error envelope.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments did not satisfy the tool's contract.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Restricted mode blocked the tool.
    #[error("{0}")]
    AccessDenied(String),

    /// The tool's own input schema does not compile.
    #[error("invalid input schema for tool {0}")]
    InvalidSchema(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: Value::Null,
        }
    }
}

impl From<FormatError> for ToolError {
    fn from(e: FormatError) -> Self {
        Self::Api(ApiError::Format(e))
    }
}

/// Protocol-level dispatch failure, reported to the client as a JSON-RPC error rather than a
/// tool result.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Tool \"{0}\" not found")]
    ToolNotFound(String),
}

/// Startup failures. These abort the process.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to start MCP server: {0}")]
    Startup(String),
}

impl From<ApiError> for ServerError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Config(msg) => Self::Config(msg),
            other => Self::Startup(other.to_string()),
        }
    }
}
