use habit_tracker::{AppState, Config, FileStore, HabitStore, check_daily_reset, router};
use std::net::SocketAddr;
use tokio::fs;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let backend = FileStore::load(&config.data_path).await;
    info!("using data file {}", backend.path().display());
    let mut store = HabitStore::open(Box::new(backend));
    if let Err(err) = tokio::task::block_in_place(|| check_daily_reset(&mut store)) {
        error!("daily reset could not be saved: {err}");
    }

    let app = router(AppState::new(store));
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
