//! Tool invocation: resolve, authorize, validate, run.

use crate::access::AccessGate;
use crate::descriptor::ToolDescriptor;
use crate::error::{DispatchError, ToolError};
use crate::registry::Registry;
use everhour_api::Gateway;
use rmcp::model::{CallToolResult, Content};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    gate: AccessGate,
    gateway: Gateway,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: Arc<Registry>, gate: AccessGate, gateway: Gateway) -> Self {
        Self {
            registry,
            gate,
            gateway,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn gate(&self) -> AccessGate {
        self.gate
    }

    /// Run one tool call.
    ///
    /// Only an unknown tool name is an `Err`. Denials, invalid arguments and upstream failures
    /// all come back as `Ok` envelopes with `is_error = Some(true)`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ToolNotFound`] if `name` is not registered.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<CallToolResult, DispatchError> {
        let descriptor = self.registry.resolve(name)?;
        debug!(tool = name, operation = %descriptor.operation, "tools/call");

        if !self.gate.authorize(descriptor) {
            info!(tool = name, operation = %descriptor.operation, "blocked by read-only mode");
            let denied = ToolError::AccessDenied(self.gate.denial_message(descriptor));
            return Ok(error_envelope(&denied));
        }

        let args = if args.is_null() { json!({}) } else { args };
        if let Err(e) = validate_arguments(descriptor, &args) {
            match e {
                ToolError::InvalidSchema(_) => warn!(tool = name, error = %e, "schema unusable"),
                _ => debug!(tool = name, error = %e, "invalid arguments"),
            }
            return Ok(error_envelope(&e));
        }

        match (descriptor.handler)(&self.gateway, args).await {
            Ok(result) => Ok(result),
            Err(e @ ToolError::Validation { .. }) => Ok(error_envelope(&e)),
            Err(e) => {
                warn!(tool = name, error = %e, "tool failed");
                Ok(text_error(format!("Error executing tool \"{name}\": {e}")))
            }
        }
    }
}

fn text_error(text: String) -> CallToolResult {
    CallToolResult::error(vec![Content::text(text)])
}

/// Envelope for a [`ToolError`]. Validation failures also carry the violation list as
/// structured content.
#[must_use]
pub fn error_envelope(error: &ToolError) -> CallToolResult {
    match error {
        ToolError::Validation { message, details } if !details.is_null() => {
            let pretty = serde_json::to_string_pretty(details).unwrap_or_else(|_| details.to_string());
            CallToolResult {
                content: vec![Content::text(format!("{message}\n{pretty}"))],
                structured_content: Some(details.clone()),
                is_error: Some(true),
                meta: None,
            }
        }
        other => text_error(other.to_string()),
    }
}

/// Check `args` against the descriptor's input schema.
///
/// # Errors
///
/// Returns [`ToolError::Validation`] listing every violation: unknown parameters (with
/// suggestions), missing required parameters, and schema constraint failures. Returns
/// [`ToolError::InvalidSchema`] if the descriptor's schema never compiled.
pub fn validate_arguments(descriptor: &ToolDescriptor, args: &Value) -> Result<(), ToolError> {
    let schema = &descriptor.input_schema;
    let validator = descriptor
        .validator()
        .map_err(|e| ToolError::InvalidSchema(format!("{}: {e}", descriptor.name)))?;
    let props = schema
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let required: Vec<String> = schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    let Some(args_obj) = args.as_object() else {
        return Err(ToolError::Validation {
            message: "Invalid params: arguments must be a JSON object".to_string(),
            details: json!({
                "type": "validation-errors",
                "violations": [{ "type": "constraint-violation", "message": "expected an object", "instancePath": "" }],
            }),
        });
    };
    let valid_params: Vec<String> = props.keys().cloned().collect();
    let valid_param_refs: Vec<&str> = valid_params.iter().map(String::as_str).collect();

    let mut violations: Vec<Value> = Vec::new();

    for k in args_obj.keys() {
        if props.contains_key(k) {
            continue;
        }
        let suggestions = find_similar_strings(k, &valid_param_refs);
        violations.push(json!({
            "type": "invalid-parameter",
            "parameter": k,
            "suggestions": suggestions,
            "validParameters": valid_params,
        }));
    }

    for r in &required {
        if !args_obj.contains_key(r) {
            violations.push(json!({
                "type": "missing-required-parameter",
                "parameter": r,
            }));
        }
    }

    // Unknown keys are reported above; strip them so `additionalProperties` does not double-count.
    let known: serde_json::Map<String, Value> = args_obj
        .iter()
        .filter(|(k, _)| props.contains_key(*k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let known = Value::Object(known);
    for e in validator.iter_errors(&known) {
        if matches!(
            e.kind(),
            jsonschema::error::ValidationErrorKind::Required { .. }
        ) {
            continue;
        }
        violations.push(json!({
            "type": "constraint-violation",
            "message": e.to_string(),
            "instancePath": e.instance_path().to_string(),
        }));
    }

    if violations.is_empty() {
        return Ok(());
    }

    let message = if let Some(v) = violations
        .iter()
        .find(|v| v.get("type").and_then(Value::as_str) == Some("invalid-parameter"))
    {
        let p = v.get("parameter").and_then(Value::as_str).unwrap_or("?");
        let suggestion = v
            .get("suggestions")
            .and_then(Value::as_array)
            .and_then(|arr| arr.first())
            .and_then(Value::as_str);
        match suggestion {
            Some(s) => format!("Invalid params: unknown parameter '{p}' (did you mean '{s}'?)"),
            None => format!("Invalid params: unknown parameter '{p}'"),
        }
    } else if let [single] = violations.as_slice()
        && single.get("type").and_then(Value::as_str) == Some("missing-required-parameter")
    {
        let p = single.get("parameter").and_then(Value::as_str).unwrap_or("?");
        format!("Invalid params: missing required parameter '{p}'")
    } else {
        format!(
            "Invalid params: validation failed with {} error(s)",
            violations.len()
        )
    };

    Err(ToolError::Validation {
        message,
        details: json!({
            "type": "validation-errors",
            "violations": violations,
        }),
    })
}

fn find_similar_strings(unknown: &str, known: &[&str]) -> Vec<String> {
    let mut candidates: Vec<(f64, String)> = Vec::new();
    for k in known {
        let score = strsim::jaro(unknown, k);
        if score > 0.7 {
            candidates.push((score, (*k).to_string()));
        }
    }
    candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    candidates.into_iter().map(|(_, s)| s).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ToolResult;
    use futures::future::BoxFuture;

    fn noop(_: &Gateway, _: Value) -> BoxFuture<'_, ToolResult> {
        Box::pin(async { Ok(CallToolResult::success(vec![])) })
    }

    fn descriptor() -> ToolDescriptor {
        ToolDescriptor::write(
            "everhour_create_time_record",
            "",
            &["time"],
            json!({
                "type": "object",
                "properties": {
                    "time": {"anyOf": [{"type": "integer", "minimum": 1}, {"type": "string", "minLength": 1}]},
                    "date": {"type": "string", "pattern": "^\\d{4}-\\d{2}-\\d{2}$"},
                    "comment": {"type": "string"}
                },
                "required": ["time", "date"],
                "additionalProperties": false
            }),
            noop,
        )
    }

    fn violations(err: &ToolError) -> Vec<Value> {
        match err {
            ToolError::Validation { details, .. } => details["violations"]
                .as_array()
                .cloned()
                .unwrap_or_default(),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn valid_arguments_pass() {
        validate_arguments(&descriptor(), &json!({"time": "1h 30m", "date": "2024-05-01"}))
            .expect("valid");
        validate_arguments(&descriptor(), &json!({"time": 60, "date": "2024-05-01"}))
            .expect("valid");
    }

    #[test]
    fn unknown_parameter_gets_suggestion() {
        let err = validate_arguments(
            &descriptor(),
            &json!({"time": 60, "date": "2024-05-01", "coment": "x"}),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid params: unknown parameter 'coment' (did you mean 'comment'?)"
        );
        assert_eq!(violations(&err).len(), 1);
    }

    #[test]
    fn missing_required_is_named_once() {
        let err = validate_arguments(&descriptor(), &json!({"time": 60})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid params: missing required parameter 'date'");
        assert_eq!(violations(&err).len(), 1);
    }

    #[test]
    fn constraint_violations_report_instance_path() {
        let err = validate_arguments(&descriptor(), &json!({"time": 0, "date": "May 1"}))
            .unwrap_err();
        let v = violations(&err);
        assert!(v.iter().any(|v| v["instancePath"] == "/date"), "{v:?}");
        assert!(v.iter().any(|v| v["instancePath"] == "/time"), "{v:?}");
        assert!(err.to_string().starts_with("Invalid params: validation failed"));
    }

    #[test]
    fn uncompilable_schema_is_reported_not_skipped() {
        let broken = ToolDescriptor::read(
            "everhour_broken",
            "",
            &["things"],
            json!({"type": "object", "properties": {"id": {"type": "text"}}}),
            noop,
        );
        let err = validate_arguments(&broken, &json!({"id": "x"})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidSchema(_)), "{err}");
        assert!(err.to_string().contains("everhour_broken"), "{err}");
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let err = validate_arguments(&descriptor(), &json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
    }

    #[test]
    fn validation_envelope_carries_structured_details() {
        let err = validate_arguments(&descriptor(), &json!({"time": 60})).unwrap_err();
        let env = error_envelope(&err);
        assert_eq!(env.is_error, Some(true));
        assert!(env.structured_content.is_some());
    }
}
