use std::sync::Arc;

use anyhow::Context;
use orpheus_console::api::{self, AppState};
use orpheus_console::config::Config;
use orpheus_console::db;
use orpheus_console::gateway::KubeGateway;
use orpheus_console::repository::PgDatastore;
use orpheus_console::service::{LifecycleService, MetricsService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orpheus_console=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Orpheus Console...");

    let config = Config::from_env().context("Failed to read configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        "Jobs namespace: {}, kubeconfig: {}",
        config.namespace,
        config
            .kubeconfig
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "inferred".to_string())
    );

    let options = config
        .connect_options()
        .context("Invalid datastore connection settings")?;
    let pool = db::create_pool(options, config.db_max_connections);

    tracing::info!("Database connection pool created");

    let gateway = KubeGateway::new(
        config.kubeconfig.clone(),
        config.connect_timeout,
        config.gateway_timeout,
    );

    let state = AppState::new(
        LifecycleService::new(Arc::new(gateway), config.namespace.clone()),
        MetricsService::new(Arc::new(PgDatastore::new(pool))),
    );

    // Build router with all API endpoints
    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
