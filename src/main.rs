#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

use std::process::ExitCode;

use catalog_api::{AppError, Result, app, config::AppConfig, database};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    match run().await {
        Ok(()) => {
            tracing::info!("Catalog API stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Catalog API failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Serves until a shutdown signal arrives. The pool is closed on every exit
/// path once it has been opened.
async fn run() -> Result<()> {
    let config = AppConfig::from_env()?;
    let pool = database::create_pool(&config.database).await?;

    let app = match app::build(&config, pool.clone()) {
        Ok(app) => app,
        Err(e) => {
            pool.close().await;
            return Err(e);
        }
    };

    let addr = config.server_address();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            pool.close().await;
            return Err(AppError::InternalError(format!("Failed to bind to {addr}: {e}")));
        }
    };
    tracing::info!("Catalog API listening on {} ({:?})", addr, config.environment);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    pool.close().await;
    served.map_err(|e| AppError::InternalError(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Ctrl+C listener unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("SIGTERM listener unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = ctrl_c => "Ctrl+C",
        _ = terminate => "SIGTERM",
    };

    tracing::info!("{} received, draining open requests", received);
}
