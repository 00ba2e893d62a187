//! Outbound request hygiene: base URL checks and error redaction.
//!
//! Transport errors end up in logs and in tool results shown to the caller, so anything that
//! could carry a credential is stripped first.

use crate::error::ApiError;
use url::Url;

/// Validate the configured base URL.
///
/// # Errors
///
/// Returns [`ApiError::Config`] for unparsable URLs, non-`http(s)` schemes, URLs without a host,
/// and URLs that embed credentials or a query string.
pub fn check_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ApiError::Config(format!("Invalid base URL '{raw}': {e}")))?;

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ApiError::Config(format!(
            "Invalid base URL '{raw}': unsupported URL scheme '{scheme}'"
        )));
    }
    if url.host_str().is_none() {
        return Err(ApiError::Config(format!(
            "Invalid base URL '{raw}': missing URL host"
        )));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(ApiError::Config(
            "Invalid base URL: credentials must be supplied via the API key, not the URL"
                .to_string(),
        ));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ApiError::Config(format!(
            "Invalid base URL '{}': query strings and fragments are not allowed",
            redact_url(&url)
        )));
    }

    Ok(url)
}

#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    // Best-effort: drop credentials + query + fragment.
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_accepts_http_and_https() {
        check_base_url("https://api.everhour.com").expect("https");
        check_base_url("http://127.0.0.1:8080/api/").expect("http with prefix");
    }

    #[test]
    fn base_url_rejects_odd_shapes() {
        for bad in [
            "api.everhour.com",
            "ftp://api.everhour.com",
            "https://user:pw@api.everhour.com",
            "https://api.everhour.com/?token=abc",
            "",
        ] {
            let err = check_base_url(bad).unwrap_err();
            assert!(matches!(err, ApiError::Config(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn redact_url_drops_query_and_credentials() {
        let url = Url::parse("https://u:p@api.everhour.com/time?api_key=secret#x").expect("url");
        let redacted = redact_url(&url);
        assert_eq!(redacted, "https://api.everhour.com/time");
    }
}
