use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tracing::{Level, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = server::config::AppConfig::load().context("Failed to load config")?;

    let db = server::database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    info!("Database connected, schema synced");

    let store = common::storage::init_store(&config.storage)
        .await
        .context("Failed to initialize object store")?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.media.fetch_timeout_secs))
        .build()
        .context("Failed to build backend fetch client")?;

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid server.host")?,
        config.server.port,
    );

    let state = server::state::AppState {
        db,
        store,
        http,
        config,
    };
    let app = server::build_router(state);

    info!("Server running at http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
