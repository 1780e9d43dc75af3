use db::services::postgres::PgMailStore;
use dotenvy::dotenv;
use http_server::{router, AppConfig, AppState};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from a .env file.
    dotenv().ok();
    // Use a JSON logger for production-ready structured logging
    tracing_subscriber::fmt().json().init();

    // --- Configuration ---
    let config = AppConfig::from_env()?;

    // --- Database Pool ---
    let db_pool = match PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Database pool created successfully.");
            pool
        }
        Err(e) => {
            error!("Failed to create database pool: {}", e);
            return Err(e.into());
        }
    };

    let store = Arc::new(PgMailStore::new(db_pool));
    store.migrate().await?;

    // --- Axum Router ---
    let app = router(AppState::new(store.clone()));

    // --- Start HTTP Server ---
    // Bind to 0.0.0.0 to be reachable in a container
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("HTTP Server listening on {}", addr);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };
    let server = axum::serve(listener, app);

    // Background session sweep
    let sweep_store = Arc::clone(&store);
    let sweep_every = Duration::from_secs(config.session_sweep_secs);
    tokio::spawn(async move {
        loop {
            match sweep_store.delete_expired_sessions().await {
                Ok(deleted) if deleted > 0 => {
                    info!("Cleanup: deleted {} expired sessions", deleted)
                }
                Ok(_) => {}
                Err(e) => error!("Session cleanup failed: {}", e),
            }
            tokio::time::sleep(sweep_every).await;
        }
    });

    if let Err(e) = server.await {
        error!("Server error: {}", e);
    }

    Ok(())
}
