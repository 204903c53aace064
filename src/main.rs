//! ubox-camera-bridge - Ubox/Ubia cloud camera bridge
//!
//! Polls the vendor portal for the account's cameras and serves their
//! online state, battery, signal and last-seen time as sensor entities.

mod api;
mod config;
mod coordinator;
mod error;
mod flow;
mod notify;
mod sensors;
mod state;
mod ubox;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::coordinator::UpdateCoordinator;
use crate::notify::DiscordNotifier;
use crate::state::AppState;
use crate::ubox::UboxClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ubox_camera_bridge=info,tower_http=debug".into()),
        )
        .init();

    tracing::info!("Starting ubox-camera-bridge...");

    // Load configuration
    let config = config::Config::load()?;
    tracing::info!("Configuration loaded for account {}", config.ubox.username);

    let notifier = Arc::new(DiscordNotifier::new(
        config.discord.as_ref().map(|d| d.webhook_url.clone()),
    ));
    if notifier.is_configured() {
        tracing::info!("Discord failure notifications enabled");
    }

    let client = Arc::new(UboxClient::new(config.ubox.clone())?);
    let coordinator = Arc::new(UpdateCoordinator::new(
        client.clone(),
        Duration::from_secs(config.coordinator.scan_interval_secs),
        config.coordinator.failure_threshold,
        notifier,
    ));

    // Initial poll before entities are registered (non-fatal)
    let _ = coordinator.first_refresh().await;

    let app_state = AppState::new(coordinator.clone(), config.ubox.clone());
    app_state.sensors.sync_entities().await;
    tracing::info!(
        "Sensor platform initialized with {} entities",
        app_state.sensors.entity_count().await
    );

    // Background refresh
    let refresh_task = tokio::spawn(async move {
        coordinator.start().await;
    });

    // Build application router
    let app = api::routes().with_state(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Teardown: stop polling and drop the portal session
    refresh_task.abort();
    client.close().await;
    tracing::info!("ubox-camera-bridge stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
