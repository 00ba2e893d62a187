use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, Uri};
use axum::routing::any;
use everhour_api::{ApiError, ApiRequest, ApiVersion, ClientConfig, Gateway, HttpTransport, Transport};
use everhour_test_support::MockUpstream;
use reqwest::StatusCode;
use serde_json::{Value, json};

fn transport(base_url: &str) -> anyhow::Result<HttpTransport> {
    Ok(HttpTransport::new(
        &ClientConfig::new("key-123").with_base_url(base_url),
    )?)
}

async fn echo(method: axum::http::Method, uri: Uri, headers: HeaderMap, body: Bytes) -> axum::Json<Value> {
    axum::Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query().unwrap_or(""),
        "key": headers.get("x-api-key").and_then(|v| v.to_str().ok()),
        "body": String::from_utf8_lossy(&body),
    }))
}

fn echo_upstream() -> Router {
    Router::new().route("/{*path}", any(echo))
}

#[tokio::test]
async fn send_attaches_key_path_query_and_body() -> anyhow::Result<()> {
    let mock = MockUpstream::spawn(echo_upstream()).await?;
    let t = transport(&format!("{}/api/", mock.base_url()))?;

    let resp = t
        .send(
            ApiRequest::put("/projects")
                .segment("ev:42")
                .with_query(&json!({"limit": 5}))
                .with_body(json!({"name": "Renamed"})),
        )
        .await?;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["method"], "PUT");
    assert_eq!(resp.body["path"], "/api/projects/ev:42");
    assert_eq!(resp.body["query"], "limit=5");
    assert_eq!(resp.body["key"], "key-123");
    let sent: Value = serde_json::from_str(resp.body["body"].as_str().unwrap_or_default())?;
    assert_eq!(sent, json!({"name": "Renamed"}));
    Ok(())
}

#[tokio::test]
async fn ids_with_slashes_reach_a_single_segment() -> anyhow::Result<()> {
    let mock = MockUpstream::spawn(echo_upstream()).await?;
    let config = ClientConfig::new("key-123").with_base_url(mock.base_url());
    let gateway = Gateway::from_config(&config, ApiVersion::Current)?;

    let echoed = gateway.get_task("a/b").await?;
    assert_eq!(echoed["path"], "/tasks/a%2Fb");

    let echoed = gateway.delete_task("7/time").await?;
    assert_eq!(echoed["method"], "DELETE");
    assert_eq!(echoed["path"], "/tasks/7%2Ftime");

    let echoed = gateway.get_task("ev:1/estimate").await?;
    assert_eq!(echoed["path"], "/tasks/ev:1%2Festimate");
    Ok(())
}

#[tokio::test]
async fn send_returns_error_statuses_as_responses() -> anyhow::Result<()> {
    async fn missing() -> (axum::http::StatusCode, axum::Json<Value>) {
        (
            axum::http::StatusCode::NOT_FOUND,
            axum::Json(json!({"message": "Not found", "code": "NOT_FOUND"})),
        )
    }

    let mock = MockUpstream::spawn(Router::new().route("/timers/current", any(missing))).await?;
    let resp = transport(mock.base_url())?
        .send(ApiRequest::get("/timers/current"))
        .await?;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_error() -> anyhow::Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);

    let err = transport(&format!("http://127.0.0.1:{port}"))?
        .send(ApiRequest::get("/users/me"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err}");
    Ok(())
}

#[tokio::test]
async fn oversized_bodies_are_rejected() -> anyhow::Result<()> {
    async fn big() -> String {
        "x".repeat(4096)
    }

    let mock = MockUpstream::spawn(Router::new().route("/projects", any(big))).await?;
    let mut cfg = ClientConfig::new("k").with_base_url(mock.base_url());
    cfg.max_response_bytes = Some(1024);
    let err = HttpTransport::new(&cfg)?
        .send(ApiRequest::get("/projects"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("too large"), "{err}");
    Ok(())
}
