mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use mentionwatch_monitor::{BroadcastPublisher, Monitor, MonitorSettings, PgMentionStore};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(mentionwatch_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let brands: Arc<[mentionwatch_core::TrackedBrand]> =
        mentionwatch_core::load_brands(&config.brands_path)?
            .tracked()
            .into();
    tracing::info!(
        count = brands.len(),
        path = %config.brands_path.display(),
        "loaded tracked brands"
    );

    let pool_config = mentionwatch_db::PoolConfig::from_app_config(&config);
    let pool = mentionwatch_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = mentionwatch_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let publisher = Arc::new(BroadcastPublisher::default());
    let adapters = mentionwatch_monitor::build_adapters(&config)?;
    tracing::info!(adapters = adapters.len(), "source adapters enabled");

    let monitor = Arc::new(Monitor::new(
        adapters,
        Arc::new(PgMentionStore::new(pool.clone())),
        publisher.clone(),
        MonitorSettings::from_app_config(&config),
    ));

    let _scheduler = scheduler::build_scheduler(
        pool.clone(),
        Arc::clone(&monitor),
        Arc::clone(&brands),
        Duration::from_secs(config.monitor_interval_secs),
    )
    .await?;

    let app = build_app(AppState {
        pool,
        publisher,
        brands,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
