mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use foodtrucks_engine::{CsvFileSource, DatasetStore};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(foodtrucks_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        env = %config.env,
        data_path = %config.data_path.display(),
        "starting food truck search server"
    );

    let store = Arc::new(DatasetStore::new(CsvFileSource::new(&config.data_path)));
    let initial = {
        let store = Arc::clone(&store);
        tokio::task::spawn_blocking(move || store.reload()).await?
    };
    if !initial.is_loaded() {
        tracing::warn!("initial dataset load failed; searches return 503 until a reload succeeds");
    }

    let mut scheduler = scheduler::build_scheduler(Arc::clone(&store), Arc::clone(&config)).await?;

    let app = build_app(AppState::new(store, config.reload_interval()));
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await?;
    tracing::info!("scheduler stopped; bye");
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
