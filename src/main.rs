use std::sync::Arc;

use bookstore::db::{CatalogStore, UserStore};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Arc::new(bookstore::Config::load()?);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        loglevel = %cfg.loglevel,
        auth_enabled = cfg.auth_enabled,
        node_env = %cfg.node_env,
        jwt_ttl_secs = cfg.jwt_ttl_secs
    );
    if !cfg.auth_enabled {
        warn!("authentication is disabled; every route is open (set AUTH_ENABLED=true to enable)");
    }

    let pool = bookstore::db::connect(&cfg.database_url).await?;

    bookstore::service::fixtures::run(
        &cfg,
        &UserStore::new(pool.clone()),
        &CatalogStore::new(pool.clone()),
    )
    .await;

    let app = bookstore::bookstore_router(cfg.clone(), pool);

    let listener = TcpListener::bind(cfg.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
