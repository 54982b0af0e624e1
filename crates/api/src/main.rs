use std::sync::Arc;

use anyhow::Context;

use eduplatform_api::app::{build_app, services};
use eduplatform_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    eduplatform_observability::init(config.log_format);

    let services = services::build_services(&config)
        .await
        .context("failed to initialize document store")?;
    let app = build_app(Arc::new(services));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
