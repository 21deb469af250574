use std::net::SocketAddr;

use anyhow::{Context, Result};
use inventory_api::{app, config, middleware, services};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load().context("failed to load configuration")?;

    middleware::logging::init_logging(&config.logging).context("failed to initialize logging")?;
    middleware::init_metrics().context("failed to install metrics recorder")?;

    info!("Starting Inventory API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&(&config.database).into())
        .await
        .context("failed to connect to database")?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    info!("Migrations completed");

    match services::bootstrap_admin(&pool, &config.admin).await {
        Ok(services::BootstrapOutcome::Created { user_id }) => {
            info!(user_id, "Bootstrap admin account created")
        }
        Ok(services::BootstrapOutcome::WeakPassword) => {
            warn!("Bootstrap admin password is too weak; no admin created")
        }
        Ok(_) => {}
        Err(e) => return Err(e).context("failed to bootstrap admin account"),
    }

    let addr = config.socket_addr().context("invalid server address")?;
    let app = app::create_app(config, pool).context("failed to build application")?;

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

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
