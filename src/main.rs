use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use s3_file_gateway::{
    config::{Settings, API_DESCRIPTION, API_TITLE, API_VERSION},
    create_router,
    utils::init_logger,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let settings = Settings::from_env()?;
    info!("{} v{} - {}", API_TITLE, API_VERSION, API_DESCRIPTION);
    info!("Configuration loaded: {:?}", settings);
    if !settings.is_valid() {
        warn!(
            "Missing required configuration: {}. Storage endpoints will fail until it is set",
            settings.missing_fields().join(", ")
        );
    }

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    // Create shared state and router
    let state = AppState::with_s3(settings);
    let app = create_router(state);

    // Start server
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
