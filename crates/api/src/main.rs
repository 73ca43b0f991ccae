use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};

use rsvp_api::app::{create_app, Stores};
use rsvp_api::config::Config;
use rsvp_api::middleware::{self, init_metrics};
use rsvp_api::services::MercadoPagoClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging);

    info!("Starting RSVP backend v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = init_metrics() {
        error!(error = %e, "Failed to initialize metrics; /metrics will be unavailable");
    }

    // Create database pool
    let pool = persistence::db::create_pool(&(&config.database).into()).await?;

    // Run migrations
    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    if config.payments.access_token.is_empty() {
        warn!("RSVP__PAYMENTS__ACCESS_TOKEN is not set; checkout and webhooks will fail");
    }
    let provider = MercadoPagoClient::new(&config.payments)?;

    // Build application
    let addr = config.socket_addr()?;
    let app = create_app(config, Stores::postgres(pool), Arc::new(provider));

    // Start server
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
