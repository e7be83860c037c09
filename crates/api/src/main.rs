use std::sync::Arc;

use anyhow::Context;

use pricelens_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    pricelens_observability::init(config.log_format);

    let services = pricelens_api::app::services::build_services(&config).await?;
    let app = pricelens_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
