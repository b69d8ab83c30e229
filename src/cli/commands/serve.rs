use anyhow::Context;

use crate::app::{app, bootstrap_admin, AppState, Stores};
use crate::config::AppConfig;
use crate::database::postgres::apply_schema;
use crate::database::connect;

pub async fn handle(port: Option<u16>, apply: bool) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(port) = port {
        config.server.port = port;
    }
    tracing::info!("Starting Umrah Portal in {:?} mode", config.environment);
    config.validate()?;

    let stores = match config.database.url.as_deref() {
        Some(url) => {
            let pool = connect(url, &config.database).await.context("failed to connect to database")?;
            if apply {
                let statements = apply_schema(&pool).await.context("failed to apply schema")?;
                tracing::info!("Applied {} schema statements", statements);
            }
            Stores::postgres(pool)
        }
        None if config.is_production() => anyhow::bail!("DATABASE_URL must be set in production"),
        None => {
            tracing::warn!("DATABASE_URL not set: using the in-memory store, data is lost on restart");
            Stores::memory()
        }
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let state = AppState::new(config, stores);
    bootstrap_admin(&state).await.context("failed to create bootstrap admin")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Umrah Portal listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
