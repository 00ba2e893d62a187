//! Built-in tool groups, one module per Everhour resource family.

mod clients;
mod expenses;
mod invoices;
mod projects;
pub(crate) mod schema;
mod schedule;
mod sections;
mod task_extensions;
mod tasks;
mod time_records;
mod timecards;
mod timers;
mod users;

use crate::descriptor::ToolDescriptor;
use crate::error::ToolError;
use everhour_api::duration;
use rmcp::model::{CallToolResult, Content};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Descriptor groups in registry merge order.
#[must_use]
pub fn all_groups() -> Vec<Vec<ToolDescriptor>> {
    vec![
        projects::tools(),
        tasks::tools(),
        task_extensions::tools(),
        time_records::tools(),
        timers::tools(),
        clients::tools(),
        sections::tools(),
        users::tools(),
        timecards::tools(),
        invoices::tools(),
        expenses::tools(),
        schedule::tools(),
    ]
}

/// Success envelope with `value` pretty-printed as the only text block.
pub(crate) fn json_result(value: &Value) -> CallToolResult {
    CallToolResult::success(vec![Content::text(pretty(value))])
}

/// Error envelope for failures a handler detects itself.
pub(crate) fn soft_error(value: &Value) -> CallToolResult {
    CallToolResult::error(vec![Content::text(pretty(value))])
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub(crate) fn count(value: &Value) -> usize {
    value.as_array().map_or(0, Vec::len)
}

/// Remove `key` from an argument object and deserialize it; the rest of the object is returned
/// as the request body.
pub(crate) fn split_off<T: DeserializeOwned>(
    mut args: Value,
    key: &str,
) -> Result<(T, Value), ToolError> {
    let raw = args
        .as_object_mut()
        .and_then(|obj| obj.remove(key))
        .ok_or_else(|| ToolError::validation(format!("Invalid params: missing required parameter '{key}'")))?;
    let value = serde_json::from_value(raw)
        .map_err(|e| ToolError::validation(format!("Invalid params: '{key}': {e}")))?;
    Ok((value, args))
}

/// A duration argument: whole seconds or `"1h 30m"` notation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum TimeInput {
    Seconds(u64),
    Text(String),
}

impl TimeInput {
    pub(crate) fn seconds(&self) -> Result<u64, ToolError> {
        let seconds = match self {
            Self::Seconds(s) => *s,
            Self::Text(t) => duration::decode(t)?,
        };
        if seconds == 0 {
            return Err(ToolError::validation("Invalid params: time must be positive"));
        }
        Ok(seconds)
    }
}

/// Replace a `time` field given in either notation with whole seconds.
pub(crate) fn normalize_time(body: &mut Value) -> Result<Option<u64>, ToolError> {
    let Some(raw) = body.get("time").cloned() else {
        return Ok(None);
    };
    let input: TimeInput = serde_json::from_value(raw)
        .map_err(|_| ToolError::validation("Invalid params: time must be seconds or text like \"1h 30m\""))?;
    let seconds = input.seconds()?;
    body["time"] = Value::from(seconds);
    Ok(Some(seconds))
}

/// `duration` as display text, when the record carries a numeric duration in `field`.
pub(crate) fn formatted(record: &Value, field: &str) -> Value {
    record
        .get(field)
        .and_then(Value::as_u64)
        .map_or(Value::Null, |s| Value::from(duration::encode(s)))
}
