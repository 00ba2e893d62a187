use async_trait::async_trait;
use everhour_api::{ApiRequest, ApiResponse, ApiVersion, Gateway, Result, Transport};
use parking_lot::Mutex;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;

struct Script {
    method: Method,
    path: String,
    responses: VecDeque<ApiResponse>,
}

/// A [`Transport`] that never touches the network.
///
/// Responses are scripted per `METHOD path`; when a script has one response left it keeps
/// answering with it. Unscripted requests get a 404 with an Everhour-shaped error body.
#[derive(Default)]
pub struct RecordingTransport {
    scripts: Mutex<Vec<Script>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl RecordingTransport {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) -> &Self {
        let mut scripts = self.scripts.lock();
        let response = ApiResponse::new(status, body);
        if let Some(s) = scripts
            .iter_mut()
            .find(|s| s.method == method && s.path == path)
        {
            s.responses.push_back(response);
        } else {
            scripts.push(Script {
                method,
                path: path.to_string(),
                responses: VecDeque::from([response]),
            });
        }
        self
    }

    pub fn ok(&self, method: Method, path: &str, body: Value) -> &Self {
        self.respond(method, path, StatusCode::OK, body)
    }

    /// A gateway backed by this transport.
    #[must_use]
    pub fn gateway(self: &Arc<Self>, version: ApiVersion) -> Gateway {
        Gateway::new(self.clone(), version)
    }

    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Requests as `"METHOD /path"` strings, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let reply = {
            let mut scripts = self.scripts.lock();
            scripts
                .iter_mut()
                .find(|s| s.method == request.method && s.path == request.path)
                .and_then(|s| {
                    if s.responses.len() > 1 {
                        s.responses.pop_front()
                    } else {
                        s.responses.front().cloned()
                    }
                })
        };
        let reply = reply.unwrap_or_else(|| {
            ApiResponse::new(
                StatusCode::NOT_FOUND,
                json!({
                    "message": format!("no scripted response for {} {}", request.method, request.path),
                    "code": "NOT_FOUND",
                }),
            )
        });
        self.requests.lock().push(request);
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_responses_are_consumed_then_sticky() {
        let t = RecordingTransport::new();
        t.ok(Method::GET, "/users/me", json!({"id": 1}))
            .ok(Method::GET, "/users/me", json!({"id": 2}));

        let g = t.gateway(ApiVersion::Current);
        assert_eq!(g.current_user().await.expect("first")["id"], 1);
        assert_eq!(g.current_user().await.expect("second")["id"], 2);
        assert_eq!(g.current_user().await.expect("sticky")["id"], 2);
        assert_eq!(t.request_count(), 3);
    }

    #[tokio::test]
    async fn unscripted_requests_are_404() {
        let t = RecordingTransport::new();
        let err = t
            .gateway(ApiVersion::Current)
            .get_project("ev:1")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(t.calls(), vec!["GET /projects/ev:1"]);
    }
}
