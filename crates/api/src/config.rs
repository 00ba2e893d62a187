use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.everhour.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Which upstream path convention a deployment talks to.
///
/// The two conventions are incompatible for timer and task-listing endpoints; a process uses
/// exactly one of them for its whole lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// `/timers/current`, `/projects/{id}/tasks`.
    #[default]
    Current,
    /// `/timer/running`, `/timer/start_for/{task}`, `/tasks/for_project/{id}`.
    Legacy,
}

impl ApiVersion {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Legacy => "legacy",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" | "v2" => Ok(Self::Current),
            "legacy" | "v1" => Ok(Self::Legacy),
            other => Err(format!(
                "unknown Everhour API version '{other}' (expected 'current' or 'legacy')"
            )),
        }
    }
}

/// Settings for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    /// Per-request timeout. `None` leaves the request unbounded.
    pub timeout: Option<Duration>,
    /// Maximum response body size (bytes). `None` = unlimited.
    pub max_response_bytes: Option<usize>,
}

impl ClientConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Some(DEFAULT_TIMEOUT),
            max_response_bytes: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::ApiVersion;

    #[test]
    fn api_version_parses_aliases() {
        assert_eq!("current".parse::<ApiVersion>(), Ok(ApiVersion::Current));
        assert_eq!(" Legacy ".parse::<ApiVersion>(), Ok(ApiVersion::Legacy));
        assert_eq!("v1".parse::<ApiVersion>(), Ok(ApiVersion::Legacy));
        assert!("v3".parse::<ApiVersion>().is_err());
    }
}
