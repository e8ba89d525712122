//! Loopboard binary entry point.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loopboard::{AppState, DashboardConfig, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loopboard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Read configuration from the environment
    let config = DashboardConfig::from_env()?;
    let bind_addr = config.bind_address;
    if config.credentials.is_some() {
        tracing::info!("Viewer endpoints gated by LOOPBOARD_USER/LOOPBOARD_PASS");
    } else {
        tracing::info!("No viewer credentials configured; endpoints are open");
    }

    // Create application state and router
    let state = Arc::new(AppState::with_config(config));
    let app = create_router(state);

    // Start the server
    tracing::info!("Starting Loopboard at http://{}", bind_addr);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
