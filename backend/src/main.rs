//! Campgrounds entry-point: loads settings, prepares storage and serves HTTP.

use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use campgrounds::inbound::http::session_config::{BuildMode, session_settings_from_env};
use campgrounds::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use campgrounds::server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let bind_addr = settings.bind_addr()?;
    let database_url = settings.database_url.clone();
    let pool_max_size = settings.pool_max_size();

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
        settings,
    );

    if let Some(url) = database_url {
        run_pending_migrations(&url)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let pool = DbPool::new(PoolConfig::new(url).with_max_size(pool_max_size))
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        info!("database pool ready");
        config = config.with_db_pool(pool);
    }

    create_server(config)?.await
}
