// Main entry point for the de-identification service

use anyhow::{Context, Result};
use clinical_deid_server::{build_app, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,clinical_deid_core=debug,clinical_deid_ner=debug,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting clinical de-identification service");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    match &config.model_dir {
        Some(dir) => tracing::info!(model_dir = %dir.display(), "Model will load on first use"),
        None => tracing::warn!("DEID_MODEL_DIR not set; running with regex detection only"),
    }
    tracing::info!(rule_set = ?config.rule_set, "Configuration loaded");

    let app = build_app(AppState::from_config(&config));

    // Start server
    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
