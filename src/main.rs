use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use movie_buddy::{
    config::Config,
    routes::{create_router, AppState},
    services::sources::CsvFileSource,
    store::CatalogStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let source = CsvFileSource::new(&config.movies_path, &config.ratings_path);
    let store = CatalogStore::new(Arc::new(source));

    // Missing inputs are fatal: fail before accepting any request.
    store.get().await.context("Failed to load catalog")?;

    let address = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(store, config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
