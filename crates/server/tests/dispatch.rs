use everhour_api::ApiVersion;
use everhour_mcp_server::{AccessGate, DispatchError, Dispatcher, Registry};
use everhour_test_support::RecordingTransport;
use reqwest::{Method, StatusCode};
use rmcp::model::{CallToolResult, RawContent};
use serde_json::{Value, json};
use std::sync::Arc;

fn dispatcher(transport: &Arc<RecordingTransport>, readonly: bool) -> Dispatcher {
    Dispatcher::new(
        Arc::new(Registry::builtin()),
        AccessGate::new(readonly),
        transport.gateway(ApiVersion::Current),
    )
}

fn text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn body(result: &CallToolResult) -> Value {
    serde_json::from_str(&text(result)).unwrap_or(Value::Null)
}

#[tokio::test]
async fn restricted_mode_blocks_delete_without_upstream_call() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    let d = dispatcher(&transport, true);

    let result = d
        .invoke("everhour_delete_project", json!({"id": "ev:1"}))
        .await?;

    assert_eq!(result.is_error, Some(true));
    let msg = text(&result);
    assert!(msg.contains("everhour_delete_project"), "{msg}");
    assert!(msg.contains("DELETE"), "{msg}");
    assert!(msg.contains("projects"), "{msg}");
    assert!(msg.contains("EVERHOUR_READONLY_MODE=false"), "{msg}");
    assert_eq!(transport.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn restricted_mode_still_serves_reads() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    transport.ok(Method::GET, "/projects", json!([{"id": "ev:1"}, {"id": "ev:2"}]));
    let d = dispatcher(&transport, true);

    let result = d.invoke("everhour_list_projects", json!({"limit": 5})).await?;

    assert_eq!(result.is_error, Some(false));
    assert_eq!(body(&result)["total"], 2);
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_value("limit"), Some("5"));
    Ok(())
}

#[tokio::test]
async fn unknown_tool_is_a_dispatch_error() {
    let transport = RecordingTransport::new();
    let d = dispatcher(&transport, false);

    let err = d.invoke("everhour_nope", json!({})).await.unwrap_err();
    assert!(matches!(err, DispatchError::ToolNotFound(ref n) if n == "everhour_nope"));
    assert_eq!(err.to_string(), "Tool \"everhour_nope\" not found");
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn missing_current_timer_is_a_normal_result() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    transport.respond(
        Method::GET,
        "/timers/current",
        StatusCode::NOT_FOUND,
        json!({"message": "Not found"}),
    );
    let d = dispatcher(&transport, false);

    let result = d.invoke("everhour_get_current_timer", Value::Null).await?;

    assert_eq!(result.is_error, Some(false));
    assert_eq!(body(&result), json!({"timer": null}));
    Ok(())
}

#[tokio::test]
async fn stop_without_running_timer_sends_no_stop() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    transport.respond(
        Method::GET,
        "/timers/current",
        StatusCode::NOT_FOUND,
        json!({"message": "Not found"}),
    );
    let d = dispatcher(&transport, false);

    let result = d.invoke("everhour_stop_timer", json!({})).await?;

    assert_eq!(result.is_error, Some(true));
    assert!(text(&result).contains("No active timer found to stop"));
    assert_eq!(transport.calls(), vec!["GET /timers/current"]);
    Ok(())
}

#[tokio::test]
async fn stop_resolves_running_timer() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    transport.ok(
        Method::GET,
        "/timers/current",
        json!({"id": 77, "status": "active", "duration": 60}),
    );
    transport.ok(Method::POST, "/timers/77/stop", json!({"id": 900, "time": 5400}));
    let d = dispatcher(&transport, false);

    let result = d.invoke("everhour_stop_timer", json!({})).await?;

    assert_eq!(result.is_error, Some(false));
    let out = body(&result);
    assert_eq!(out["timeFormatted"], "1h 30m 0s");
    assert_eq!(
        transport.calls(),
        vec!["GET /timers/current", "POST /timers/77/stop"]
    );
    Ok(())
}

#[tokio::test]
async fn start_while_running_is_a_soft_error() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    transport.ok(
        Method::GET,
        "/timers/current",
        json!({"id": 5, "status": "active", "duration": 3600}),
    );
    let d = dispatcher(&transport, false);

    let result = d
        .invoke("everhour_start_timer", json!({"task": "ev:9"}))
        .await?;

    assert_eq!(result.is_error, Some(true));
    let out = body(&result);
    assert_eq!(out["success"], false);
    assert_eq!(out["currentTimer"]["durationFormatted"], "1h 0m 0s");
    assert!(out["message"].as_str().is_some_and(|m| m.contains("already running")));
    assert_eq!(transport.calls(), vec!["GET /timers/current"]);
    Ok(())
}

#[tokio::test]
async fn invalid_arguments_never_reach_upstream() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    let d = dispatcher(&transport, false);

    let result = d
        .invoke("everhour_get_project", json!({"idd": "ev:1"}))
        .await?;

    assert_eq!(result.is_error, Some(true));
    let msg = text(&result);
    assert!(msg.contains("unknown parameter 'idd'"), "{msg}");
    assert!(msg.contains("did you mean 'id'"), "{msg}");
    let details = result.structured_content.expect("structured details");
    assert_eq!(details["type"], "validation-errors");
    assert_eq!(transport.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn blank_ids_are_rejected_as_validation_errors() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    let d = dispatcher(&transport, false);

    for (tool, args) in [
        ("everhour_get_project", json!({"id": ""})),
        ("everhour_delete_task", json!({"id": ""})),
        ("everhour_get_tasks_for_project", json!({"projectId": ""})),
    ] {
        let result = d.invoke(tool, args).await?;
        assert_eq!(result.is_error, Some(true), "{tool}");
        let details = result.structured_content.expect("structured details");
        assert_eq!(details["type"], "validation-errors", "{tool}");
        assert_eq!(details["violations"][0]["type"], "constraint-violation", "{tool}");
    }
    assert_eq!(transport.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn ids_with_separators_stay_one_segment() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    transport.ok(Method::DELETE, "/tasks/7%2Ftime", Value::Null);
    let d = dispatcher(&transport, false);

    let result = d.invoke("everhour_delete_task", json!({"id": "7/time"})).await?;

    assert_eq!(result.is_error, Some(false), "{}", text(&result));
    assert_eq!(transport.calls(), vec!["DELETE /tasks/7%2Ftime"]);
    assert_eq!(transport.requests()[0].segments, vec!["tasks", "7/time"]);
    Ok(())
}

#[tokio::test]
async fn zero_duration_text_never_reaches_upstream() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    let d = dispatcher(&transport, false);

    let result = d
        .invoke(
            "everhour_create_time_record",
            json!({"task": "ev:3", "date": "2024-05-01", "time": "0s"}),
        )
        .await?;

    assert_eq!(result.is_error, Some(true));
    assert_eq!(text(&result), "Invalid params: time must be positive");
    assert_eq!(transport.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn time_text_is_converted_to_seconds() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    transport.ok(Method::POST, "/time", json!({"id": 1, "time": 5400}));
    let d = dispatcher(&transport, false);

    let result = d
        .invoke(
            "everhour_create_time_record",
            json!({"task": "ev:3", "date": "2024-05-01", "time": "1h 30m"}),
        )
        .await?;

    assert_eq!(result.is_error, Some(false), "{}", text(&result));
    let sent = transport.requests();
    assert_eq!(sent[0].body.as_ref().map(|b| b["time"].clone()), Some(json!(5400)));
    Ok(())
}

#[tokio::test]
async fn bad_time_text_is_reported() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    let d = dispatcher(&transport, false);

    let result = d
        .invoke(
            "everhour_create_time_record",
            json!({"task": "ev:3", "date": "2024-05-01", "time": "later"}),
        )
        .await?;

    assert_eq!(result.is_error, Some(true));
    assert!(text(&result).contains("Invalid time format 'later'"), "{}", text(&result));
    assert_eq!(transport.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn upstream_failure_is_wrapped_with_tool_name() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    transport.respond(
        Method::GET,
        "/projects/ev:1",
        StatusCode::FORBIDDEN,
        json!({"message": "Forbidden", "code": "ACCESS_DENIED"}),
    );
    let d = dispatcher(&transport, false);

    let result = d.invoke("everhour_get_project", json!({"id": "ev:1"})).await?;

    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        text(&result),
        "Error executing tool \"everhour_get_project\": Everhour API Error: Forbidden (ACCESS_DENIED)"
    );
    Ok(())
}

#[tokio::test]
async fn schedule_tools_fail_locally() -> anyhow::Result<()> {
    let transport = RecordingTransport::new();
    let d = dispatcher(&transport, false);

    let result = d
        .invoke("everhour_list_schedule_assignments", json!({}))
        .await?;

    assert_eq!(result.is_error, Some(true));
    assert!(text(&result).contains("not available"), "{}", text(&result));
    assert_eq!(transport.request_count(), 0);
    Ok(())
}
