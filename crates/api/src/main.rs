use anyhow::Context;

use roomshare_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env()?;
    roomshare_observability::init_with(config.log_format);
    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let app = roomshare_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
