use std::net::SocketAddr;

use anyhow::Context;
use emporium_api::{app, AppState};
use emporium_store::{app_config::Config, DbClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "emporium_api=debug,emporium_order=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Emporium API on port {}", config.server.port);

    let db = DbClient::from_config(&config.database)
        .await
        .context("Failed to connect to Postgres")?;

    let app_state = match db {
        Some(db) => {
            tracing::info!("Using Postgres storage");
            AppState::postgres(&db, &config)
        }
        None => {
            tracing::warn!("No database url configured, orders and catalog are kept in memory");
            AppState::in_memory(config.orders.code_length, config.paging)
        }
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
