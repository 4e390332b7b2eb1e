use anyhow::{Context, Result};
use tripgenie_api::{build_app, AppConfig};
use tripgenie_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("tripgenie_api");

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app = build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(
        bind = %config.bind,
        model = %config.gemini.model,
        travel_base_url = %config.travel.base_url,
        "tripgenie api started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
