pub mod api;
pub mod config;
pub mod pipeline;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{start_triage_server, ApiContext};
use crate::config::TriageConfig;
use crate::pipeline::triage::YandexClient;

/// Start the triage service and block until Ctrl-C.
pub async fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = TriageConfig::from_env().map_err(|e| e.to_string())?;
    if config.api_key.is_none() {
        tracing::warn!("YANDEX_CLOUD_API_KEY is not set; completion calls will fail");
    }
    if config.model_uri.is_empty() {
        tracing::warn!("YC_AGENT_ID is not set; provider will reject requests");
    }

    let client = YandexClient::from_config(&config).map_err(|e| e.to_string())?;
    let bind_addr = config.bind_addr;
    let ctx = ApiContext::new(Arc::new(client), config);

    let mut server = start_triage_server(ctx, bind_addr).await?;
    tracing::info!(
        addr = %server.session.server_addr,
        session_id = %server.session.session_id,
        "Listening"
    );

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for shutdown signal: {e}"))?;
    server.shutdown();
    Ok(())
}
