//! Request/response contract with the upstream and its reqwest implementation.
//!
//! A [`Transport`] only moves bytes: it returns every HTTP response, successful or not, and
//! fails only when no response was received. Interpreting status codes is the gateway's job.

use crate::config::{API_KEY_HEADER, ClientConfig};
use crate::error::{ApiError, Result};
use crate::safety::{check_base_url, sanitize_reqwest_error};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// One upstream call.
///
/// The path is held as segments. Fixed parts come from the constructor; caller-supplied ids are
/// appended with [`ApiRequest::segment`] and always stay a single segment on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Printable path relative to the base URL, e.g. `/projects/ev:1`. A `/` or `%` inside a
    /// segment is shown escaped (`%2F`, `%25`), as it is sent.
    pub path: String,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// `path` is a fixed route such as `/timers/current`; it is split on `/`.
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        let mut request = Self {
            method,
            path: String::new(),
            segments: Vec::new(),
            query: Vec::new(),
            body: None,
        };
        for part in path.split('/').filter(|s| !s.is_empty()) {
            request = request.segment(part);
        }
        request
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append one path segment verbatim. Separators inside it are escaped, never followed.
    #[must_use]
    pub fn segment(mut self, value: impl std::fmt::Display) -> Self {
        let value = value.to_string();
        self.path.push('/');
        self.path
            .push_str(&value.replace('%', "%25").replace('/', "%2F"));
        self.segments.push(value);
        self
    }

    /// Whether any segment is blank, which would make the path address a different resource.
    #[must_use]
    pub fn has_empty_segment(&self) -> bool {
        self.segments.iter().any(|s| s.trim().is_empty())
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append every non-null top-level field of `params` as a query parameter.
    ///
    /// Arrays are repeated (`k=a&k=b`); nested objects are sent as compact JSON.
    #[must_use]
    pub fn with_query(mut self, params: &Value) -> Self {
        let Some(obj) = params.as_object() else {
            return self;
        };
        for (key, value) in obj {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        self.query.push((key.clone(), value_to_string(item)));
                    }
                }
                other => self.query.push((key.clone(), value_to_string(other))),
            }
        }
        self
    }

    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw upstream answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// Decoded JSON body, `Null` for an empty body, or a string for non-JSON text.
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue exactly one request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when no response was received. Non-2xx responses are
    /// returned as `Ok`.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed transport with API key authentication.
#[derive(Clone)]
pub struct HttpTransport {
    base_url: Url,
    api_key: HeaderValue,
    client: Client,
    timeout: Option<Duration>,
    max_response_bytes: Option<usize>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the base URL is invalid, the API key is empty or not a
    /// valid header value, or the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = check_base_url(&config.base_url)?;

        let key = config.api_key.trim();
        if key.is_empty() {
            return Err(ApiError::Config("API key must not be empty".to_string()));
        }
        let mut api_key = HeaderValue::from_str(key).map_err(|_| {
            ApiError::Config("API key contains characters not allowed in a header".to_string())
        })?;
        api_key.set_sensitive(true);

        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            api_key,
            client,
            timeout: config.timeout.filter(|t| !t.is_zero()),
            max_response_bytes: config.max_response_bytes,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ApiError::Config(format!(
                    "base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?;
            segments.pop_if_empty().extend(&request.segments);
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.build_url(&request)?;
        debug!(method = %request.method, path = %request.path, "everhour request");

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(API_KEY_HEADER, self.api_key.clone())
            .header(ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(sanitize_reqwest_error(&e)))?;
        let status = response.status();
        let bytes = read_body_limited(response, self.max_response_bytes).await?;
        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            bytes = bytes.len(),
            "everhour response"
        );

        Ok(ApiResponse::new(status, decode_body(&bytes)))
    }
}

async fn read_body_limited(
    mut response: reqwest::Response,
    max_bytes: Option<usize>,
) -> Result<Vec<u8>> {
    let Some(max) = max_bytes else {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(sanitize_reqwest_error(&e)))?;
        return Ok(bytes.to_vec());
    };

    if let Some(len) = response.content_length()
        && len > max as u64
    {
        return Err(ApiError::Transport(format!(
            "Response too large: {len} bytes (limit {max})"
        )));
    }

    let mut out: Vec<u8> = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ApiError::Transport(sanitize_reqwest_error(&e)))?
    {
        if out.len().saturating_add(chunk.len()) > max {
            return Err(ApiError::Transport(format!(
                "Response too large: exceeded {max} bytes"
            )));
        }
        out.extend_from_slice(&chunk);
    }

    Ok(out)
}

fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport(base_url: &str) -> HttpTransport {
        HttpTransport::new(&ClientConfig::new("key-123").with_base_url(base_url)).expect("transport")
    }

    #[test]
    fn with_query_skips_nulls_and_repeats_arrays() {
        let req = ApiRequest::get("/team/time").with_query(&json!({
            "from": "2024-01-01",
            "limit": 10,
            "project": null,
            "tags": ["a", "b"],
        }));
        assert_eq!(req.query_value("from"), Some("2024-01-01"));
        assert_eq!(req.query_value("limit"), Some("10"));
        assert_eq!(req.query_value("project"), None);
        assert_eq!(
            req.query.iter().filter(|(k, _)| k == "tags").count(),
            2
        );
    }

    #[test]
    fn segments_are_encoded_individually() {
        let t = transport("http://localhost:9/api/");
        let url = t
            .build_url(&ApiRequest::delete("/tasks").segment("7/time"))
            .expect("url");
        assert_eq!(url.path(), "/api/tasks/7%2Ftime");

        let url = t
            .build_url(&ApiRequest::get("/projects").segment("50%"))
            .expect("url");
        assert_eq!(url.path(), "/api/projects/50%25");
    }

    #[test]
    fn decode_body_handles_empty_and_text() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b" \n"), Value::Null);
        assert_eq!(decode_body(br#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(decode_body(b"Bad Gateway"), json!("Bad Gateway"));
    }

    #[test]
    fn new_rejects_empty_or_invalid_api_key() {
        let err = HttpTransport::new(&ClientConfig::new("  ")).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        let err = HttpTransport::new(&ClientConfig::new("bad\nkey")).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
