//! # SiteDesk API Server
//!
//! Admin backend for employees, projects, billing, quotations, website quote
//! requests and task reminders.
//!
//! Without `DATABASE_URL` the server starts in fallback mode: `admin` / `123`
//! logs in, reads return empty results and writes are echoed back.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/sitedesk cargo run -p sitedesk-api
//! ```

use anyhow::Context;
use sitedesk_api::{
    app::{build_router, AppState},
    config::Config,
};
use sitedesk_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitedesk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("SiteDesk API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("invalid configuration")?;

    let db = match &config.database {
        Some(db_config) => {
            let pool = pool::create_pool(pool::DatabaseConfig {
                url: db_config.url.clone(),
                max_connections: db_config.max_connections,
                ..Default::default()
            })
            .await
            .context("failed to connect to the database")?;

            if db_config.run_migrations {
                migrations::run_migrations(&pool)
                    .await
                    .context("failed to run database migrations")?;
            }

            Some(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; running in fallback mode with stub responses");
            None
        }
    };

    let addr = config.bind_address();
    let state = AppState::new(db.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = db {
        pool::close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
