use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::info;

use taskhub::{
    auth::SessionKeys,
    build_router,
    config::Config,
    db::{connection::init_pool, memory::MemoryStore, repos::PgStore, Store},
    logging, services,
    storage::FsObjectStore,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let config = Config::parse();
    logging::init(config.log_format);

    let store: Arc<dyn Store> = if config.in_memory {
        info!("using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or("DATABASE_URL is required unless --in-memory is set")?;
        let pool = init_pool(database_url, config.pool_size)?;
        Arc::new(PgStore::new(pool))
    };
    services::seed::run(store.as_ref()).await?;

    let objects =
        FsObjectStore::open(config.storage_dir.clone(), config.public_url.as_str()).await?;
    let sessions = SessionKeys::new(&config.jwt_secret, config.session_minutes);
    let state = AppState::new(store, Arc::new(objects), sessions);

    let listener = TcpListener::bind(&config.app_url).await?;
    info!(address = %listener.local_addr()?, "taskhub listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
