use anyhow::Context as _;
use clap::Parser as _;
use everhour_api::Gateway;
use everhour_mcp_server::cli::{Config, LogFormat};
use everhour_mcp_server::{AccessGate, Dispatcher, EverhourServer, Registry, ServerError};
use rmcp::ServiceExt as _;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(&config);

    let client = match config.client_config() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "refusing to start");
            return Err(e).context("invalid configuration");
        }
    };
    let gateway = Gateway::from_config(&client, config.api_version)
        .map_err(ServerError::from)
        .context("invalid configuration")?;

    let registry = Arc::new(Registry::builtin());
    let gate = AccessGate::new(config.readonly_mode);
    info!(
        api_version = %gateway.api_version(),
        base_url = %client.base_url,
        "{}",
        gate.summary(&registry)
    );

    // The self-check never blocks or aborts startup.
    let probe = gateway.clone();
    tokio::spawn(async move {
        match probe.ping().await {
            Ok(()) => info!("Everhour API connection verified"),
            Err(e) => warn!(error = %e, "Everhour API connection check failed"),
        }
    });

    let server = EverhourServer::new(Dispatcher::new(registry, gate, gateway));
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| ServerError::Startup(e.to_string()))?;
    info!("MCP server running on stdio");

    tokio::select! {
        res = service.waiting() => {
            let reason = res.context("MCP service task failed")?;
            info!(?reason, "MCP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);
    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
