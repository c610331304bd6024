//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{db::DbAdapter, files::DiskFileAdapter, notify::LogNotifier},
    config::Config,
    error::ApiError,
    web::{router, state::AppState},
};
use chrono::Duration;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use taskhive_core::{Marketplace, MemorySessionStore, ResumeManager, SessionAuthority};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Adapters & Core Services ---
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let file_adapter = Arc::new(DiskFileAdapter::new(config.upload_dir.clone()));
    let session_store = Arc::new(MemorySessionStore::new());
    let notifier = Arc::new(LogNotifier::new());

    let resumes = ResumeManager::new(file_adapter, config.public_base_url.clone());
    let authority = Arc::new(SessionAuthority::new(
        db_adapter.clone(),
        session_store,
        resumes.clone(),
        Duration::seconds(config.session_ttl_secs),
    ));
    let marketplace = Arc::new(Marketplace::new(
        authority.clone(),
        db_adapter.clone(),
        notifier,
    ));

    // --- 4. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState {
        authority,
        marketplace,
        workers: db_adapter.clone(),
        resumes,
        db: db_adapter,
        config: config.clone(),
    });
    let app = router(app_state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
