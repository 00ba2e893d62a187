//! Command line and environment configuration.

use crate::access::{READONLY_ENV, is_truthy};
use crate::error::ServerError;
use clap::{ArgAction, Parser, ValueEnum};
use everhour_api::config::DEFAULT_BASE_URL;
use everhour_api::{ApiVersion, ClientConfig};
use std::time::Duration;

pub const API_KEY_ENV: &str = "EVERHOUR_API_KEY";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "everhour-mcp-server", version, about = "Everhour MCP server (stdio)")]
pub struct Config {
    /// Everhour API key.
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "EVERHOUR_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Only expose read tools that are explicitly marked read-only.
    #[arg(
        long,
        env = READONLY_ENV,
        action = ArgAction::Set,
        value_parser = parse_flag,
        num_args = 0..=1,
        default_missing_value = "true",
        default_value = "false"
    )]
    pub readonly_mode: bool,

    /// Upstream path convention: `current` or `legacy`.
    #[arg(long, env = "EVERHOUR_API_VERSION", default_value = "current")]
    pub api_version: ApiVersion,

    /// Per-request timeout in seconds. 0 disables the timeout.
    #[arg(long, env = "EVERHOUR_API_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    #[arg(long, env = "EVERHOUR_API_MAX_RESPONSE_BYTES")]
    pub max_response_bytes: Option<usize>,

    /// Default log filter. `RUST_LOG` takes precedence.
    #[arg(long, env = "EVERHOUR_MCP_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[allow(clippy::unnecessary_wraps)]
fn parse_flag(raw: &str) -> Result<bool, String> {
    Ok(is_truthy(raw))
}

impl Config {
    /// Transport settings. The API key is the only setting without a usable default.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] when the API key is missing or blank.
    pub fn client_config(&self) -> Result<ClientConfig, ServerError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ServerError::Config(format!("{API_KEY_ENV} environment variable is required"))
            })?;

        let mut config = ClientConfig::new(api_key).with_base_url(self.base_url.trim());
        config.timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        config.max_response_bytes = self.max_response_bytes;
        Ok(config)
    }
}
