use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use common::utils::logging::{init_logging_default, init_logging_json};
use configs::AppConfig;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// `config.toml` (or `CONFIG_PATH`) first, then defaults plus environment variables.
/// The second value carries the file error when the fallback was used.
pub fn load_config() -> Result<(AppConfig, Option<String>), StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok((cfg, None)),
        Err(file_err) => {
            let cfg = AppConfig::from_env()
                .map_err(|env_err| StartupError::InvalidConfig(format!("{file_err}; {env_err}")))?;
            Ok((cfg, Some(file_err.to_string())))
        }
    }
}

fn init_logging(cfg: &AppConfig) {
    if cfg.server.json_logs {
        init_logging_json();
    } else {
        init_logging_default();
    }
}

pub fn build_router(state: AppState) -> Router {
    routes::build_router(state)
}

/// Periodically drop expired cache entries and elapsed rate-limit windows.
fn spawn_sweeper(state: &AppState) {
    let cache = state.cache.clone();
    let limiters = state.limiters.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            tick.tick().await;
            let purged = cache.purge_expired();
            limiters.sweep();
            debug!(purged, "cache and limiter sweep");
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl_c");
        return;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
}

/// Public entry: load config, prepare the database and serve HTTP until Ctrl+C.
pub async fn run() -> Result<(), StartupError> {
    dotenv().ok();
    let (cfg, file_err) = load_config()?;
    init_logging(&cfg);
    if let Some(e) = file_err {
        warn!(error = %e, "config file unavailable, using environment");
    }

    let db = models::db::connect_with(&cfg.database).await?;
    migration::Migrator::up(&db, None).await.map_err(anyhow::Error::from)?;
    info!(event = "migrations_applied");
    service::seed::run(&db, &cfg.seed).await.map_err(anyhow::Error::from)?;

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))?;
    let prefix = cfg.api_prefix();
    let state = AppState::new(db, cfg);
    spawn_sweeper(&state);
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    info!(%addr, %prefix, "marketplace server listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)?;
    Ok(())
}
