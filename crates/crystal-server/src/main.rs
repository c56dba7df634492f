mod api;
mod mail;
mod middleware;

use std::sync::Arc;

use crystal_storage::BlobStore;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    mail::Mailer,
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(crystal_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = crystal_db::PoolConfig::from_app_config(&config);
    let pool = crystal_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = crystal_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied database migrations");
    }

    let storage = BlobStore::from_config(&config.storage)?;
    let mailer = Mailer::from_config(&config.mail)?;
    if matches!(mailer, Mailer::Log { .. }) {
        tracing::warn!("CRYSTAL_SMTP_HOST not set; contact messages will be logged, not sent");
    }

    let rate_limit = RateLimitState::per_minute(config.rate_limit_per_minute);
    let app = build_app(
        AppState {
            pool,
            storage,
            mailer,
            config: Arc::clone(&config),
        },
        rate_limit,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "crystal-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
