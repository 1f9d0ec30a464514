use anyhow::Context;
use std::sync::Arc;

use crate::app::app;
use crate::auth::TokenSigner;
use crate::config::{AppConfig, SelfOrAdminPolicy};
use crate::database::{DatabaseManager, PgAccountStore};
use crate::state::AppState;

pub async fn handle() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting usergate-api in {:?} mode", config.environment);

    if config.security.self_or_admin == SelfOrAdminPolicy::Observed {
        tracing::warn!(
            "SECURITY_SELF_OR_ADMIN_MODE=observed: any authenticated account can read and update any other account"
        );
    }

    let signer = TokenSigner::from_config(&config.security).context("invalid token secret")?;
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    DatabaseManager::ensure_schema(&pool)
        .await
        .context("failed to prepare the users table")?;

    let bind_addr = config.bind_addr();
    let state = AppState::new(Arc::new(PgAccountStore::new(pool.clone())), signer, config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("usergate-api listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close(pool).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
