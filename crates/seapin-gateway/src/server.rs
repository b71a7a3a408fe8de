//! Server startup and lifecycle

use crate::{routes, AppState, GatewayConfig};
use anyhow::Context;
use seapin_store::ContentStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Make sure the content bucket exists, creating it if needed.
///
/// Any failure here is fatal: the gateway never starts half-provisioned.
pub async fn provision_bucket(store: &dyn ContentStore) -> anyhow::Result<()> {
    let created = store
        .ensure_bucket()
        .await
        .with_context(|| format!("failed to provision bucket {:?}", store.bucket()))?;
    if !created {
        info!(bucket = %store.bucket(), "Bucket ready");
    }
    Ok(())
}

/// Run the gateway server until `shutdown_signal` resolves
pub async fn run_server_with_shutdown(
    config: GatewayConfig,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config.clone())?);
    provision_bucket(state.store.as_ref()).await?;

    let app = routes::create_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("🚀 Seapin gateway listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("👋 Gateway shutdown complete");

    Ok(())
}
