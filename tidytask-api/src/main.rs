//! # TidyTask server
//!
//! Serves the JSON API under `/api` and the HTML pages under `/tasks` and
//! `/auth`.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/tidytask JWT_SECRET=... cargo run -p tidytask-api
//! ```

use anyhow::Context as _;
use std::sync::Arc;
use tidytask_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use tidytask_shared::{
    db::{migrations, pool},
    seed,
    store::PgStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    tracing::info!(
        "TidyTask server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    if !config.api.production {
        migrations::ensure_database_exists(&config.database.url)
            .await
            .context("Failed to create database")?;
    }

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    migrations::run_migrations(&db)
        .await
        .context("Failed to run migrations")?;
    let status = migrations::get_migration_status(&db).await?;
    tracing::info!(
        applied = status.applied_migrations,
        latest = ?status.latest_version,
        "Migrations applied"
    );

    let store = Arc::new(PgStore::new(db));

    match seed::seed_admin(store.as_ref(), &config.admin_account()).await {
        Ok(Some(admin)) => tracing::info!(username = %admin.username, "Created default administrator"),
        Ok(None) => tracing::debug!("Users exist, skipping first-run seed"),
        Err(e) => tracing::error!(error = %e, "First-run seed failed"),
    }

    let address = config.bind_address();
    let state = AppState::new(store, config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    tracing::info!("Server listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tidytask_api=debug,tidytask_shared=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, finishing in-flight requests...");
}
