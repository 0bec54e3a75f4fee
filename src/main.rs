use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use anirec_api::{
    config::Config, routes::create_router, services::providers::HttpProvider, state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let provider = HttpProvider::new(
        config.upstream_url.clone(),
        Duration::from_secs(config.upstream_timeout_secs),
    )?;
    let state = AppState::new(Arc::new(provider));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, upstream = %config.upstream_url, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
