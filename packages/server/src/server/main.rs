// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use mindsync_core::domains::auth::JwtService;
use mindsync_core::domains::catalog::Catalog;
use mindsync_core::kernel::{
    IdentityToolkitClient, PostgresDocumentStore, ServerDeps, TracingNotifier,
};
use mindsync_core::server::{build_app, AppState};
use mindsync_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mindsync_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MindSync API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Wire dependencies
    let store = Arc::new(PostgresDocumentStore::new(pool));
    let notifier = Arc::new(TracingNotifier);
    let auth = Arc::new(
        IdentityToolkitClient::new(config.identity_api_key, config.identity_base_url)
            .context("Failed to create identity client")?,
    );
    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer));
    let server_deps = ServerDeps::new(store.clone(), auth, notifier.clone(), jwt_service);

    // Initial catalog load; a failure leaves it empty until the next refresh
    let catalog = Arc::new(Catalog::new(store, notifier));
    if let Err(e) = catalog.load().await {
        tracing::warn!(error = %e, "Starting with an empty catalog");
    }

    // Build application
    let app = build_app(AppState::new(server_deps, catalog), &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("GraphQL playground: http://localhost:{}/graphql", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
