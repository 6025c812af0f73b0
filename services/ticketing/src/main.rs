use std::sync::Arc;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use boxoffice_core::config::Config as _;
use boxoffice_core::tracing::init_tracing;
use boxoffice_domain::clock::SystemClock;
use boxoffice_ticketing::config::{HoldPolicy, TicketingConfig};
use boxoffice_ticketing::router::build_router;
use boxoffice_ticketing::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = TicketingConfig::from_env()?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let state = AppState {
        db,
        clock: Arc::new(SystemClock),
        policy: HoldPolicy::from(&config),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.ticketing_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("ticketing service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
