//! Error types for `everhour-api`.

use crate::duration::FormatError;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub const UNKNOWN_MESSAGE: &str = "Unknown API error";
pub const UNKNOWN_CODE: &str = "UNKNOWN_ERROR";

/// A non-2xx Everhour response, normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamError {
    pub status: u16,
    pub message: String,
    pub code: String,
    pub details: Map<String, Value>,
}

impl UpstreamError {
    /// Build from a decoded error body. Missing or mistyped fields fall back to sentinels.
    #[must_use]
    pub fn from_body(status: u16, body: &Value) -> Self {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_MESSAGE)
            .to_string();
        let code = match body.get("code") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => UNKNOWN_CODE.to_string(),
        };
        let details = body
            .get("details")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Self {
            status,
            message,
            code,
            details,
        }
    }
}

/// Main error type for gateway calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The upstream answered with a non-2xx status.
    #[error("Everhour API Error: {} ({})", .0.message, .0.code)]
    Upstream(UpstreamError),

    /// No response was received (connect failure, timeout, body read failure).
    #[error("Everhour transport error: {0}")]
    Transport(String),

    /// "Stop timer" was asked to resolve the current timer and there was none.
    #[error("No active timer found to stop")]
    NoActiveTimer,

    /// The operation has no upstream endpoint.
    #[error("{0} endpoints are not available in the Everhour API")]
    NotAvailable(&'static str),

    #[error(transparent)]
    Format(#[from] FormatError),

    /// A caller-supplied value cannot be sent, e.g. a blank id in a path.
    #[error("Invalid params: {0}")]
    InvalidArgument(String),

    /// Invalid client configuration (bad base URL, unusable credential).
    #[error("configuration error: {0}")]
    Config(String),

    /// A 2xx body that could not be interpreted.
    #[error("unexpected Everhour response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Upstream status code, if the upstream answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream(e) => Some(e.status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
