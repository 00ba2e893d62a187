use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Json;
use everhour_test_support::{McpStdioSession, MockUpstream};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::process::Command;

const BIN: &str = env!("CARGO_BIN_EXE_everhour-mcp-server");

fn upstream() -> Router {
    Router::new()
        .route(
            "/users/me",
            get(|headers: HeaderMap| async move {
                match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
                    Some("test-key") => (StatusCode::OK, Json(json!({"id": 1, "name": "Tester"}))),
                    _ => (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"message": "Invalid API key", "code": "UNAUTHORIZED"})),
                    ),
                }
            }),
        )
        .route(
            "/timers/current",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({"message": "No timer"}))) }),
        )
}

fn server(base_url: &str, readonly: &str) -> Command {
    let mut cmd = Command::new(BIN);
    cmd.env("EVERHOUR_API_KEY", "test-key")
        .env("EVERHOUR_API_BASE_URL", base_url)
        .env("EVERHOUR_READONLY_MODE", readonly)
        .env_remove("EVERHOUR_API_VERSION")
        .env_remove("RUST_LOG");
    cmd
}

fn text_of(result: &Value) -> String {
    result["content"][0]["text"].as_str().unwrap_or_default().to_string()
}

#[test]
fn missing_api_key_exits_non_zero() -> anyhow::Result<()> {
    let status = std::process::Command::new(BIN)
        .env_remove("EVERHOUR_API_KEY")
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()?;
    assert!(!status.success());
    Ok(())
}

#[tokio::test]
async fn lists_tools_with_annotations() -> anyhow::Result<()> {
    let mock = MockUpstream::spawn(upstream()).await?;
    let mut session = McpStdioSession::connect(server(mock.base_url(), "false")).await?;

    let msg = session
        .request(1, "tools/list", json!({}), Duration::from_secs(10))
        .await?;
    let tools = msg["result"]["tools"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    assert!(tools.len() > 60, "only {} tools", tools.len());

    let delete = tools
        .iter()
        .find(|t| t["name"] == "everhour_delete_task")
        .expect("delete tool listed");
    assert_eq!(delete["annotations"]["destructiveHint"], true);
    assert_eq!(delete["annotations"]["readOnlyHint"], false);
    assert_eq!(delete["inputSchema"]["type"], "object");

    let read = tools
        .iter()
        .find(|t| t["name"] == "everhour_list_projects")
        .expect("read tool listed");
    assert_eq!(read["annotations"]["readOnlyHint"], true);
    Ok(())
}

#[tokio::test]
async fn unknown_tool_is_method_not_found() -> anyhow::Result<()> {
    let mock = MockUpstream::spawn(upstream()).await?;
    let mut session = McpStdioSession::connect(server(mock.base_url(), "false")).await?;

    let msg = session
        .request(
            2,
            "tools/call",
            json!({"name": "everhour_does_not_exist", "arguments": {}}),
            Duration::from_secs(10),
        )
        .await?;
    assert_eq!(msg["error"]["code"], -32601, "{msg}");
    Ok(())
}

#[tokio::test]
async fn current_timer_absent_over_stdio() -> anyhow::Result<()> {
    let mock = MockUpstream::spawn(upstream()).await?;
    let mut session = McpStdioSession::connect(server(mock.base_url(), "false")).await?;

    let result = session
        .call_tool(3, "everhour_get_current_timer", json!({}))
        .await?;
    assert_ne!(result["isError"], true, "{result}");
    let body: Value = serde_json::from_str(&text_of(&result))?;
    assert_eq!(body, json!({"timer": null}));
    Ok(())
}

#[tokio::test]
async fn readonly_env_blocks_writes() -> anyhow::Result<()> {
    let mock = MockUpstream::spawn(upstream()).await?;
    let mut session = McpStdioSession::connect(server(mock.base_url(), "YES")).await?;

    let result = session
        .call_tool(4, "everhour_create_client", json!({"name": "Acme"}))
        .await?;
    assert_eq!(result["isError"], true);
    let text = text_of(&result);
    assert!(text.contains("everhour_create_client"), "{text}");
    assert!(text.contains("WRITE"), "{text}");
    assert!(text.contains("clients"), "{text}");

    let result = session
        .call_tool(5, "everhour_get_current_user", json!({}))
        .await?;
    assert_ne!(result["isError"], true, "{result}");
    assert!(text_of(&result).contains("Tester"));
    Ok(())
}
