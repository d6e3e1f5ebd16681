//! Starts the ordering service: loads configuration from the environment,
//! spins up the [`OrderingSystem`] and serves the HTTP API until Ctrl+C or
//! SIGTERM.

use tableside::api;
use tableside::config::Config;
use tableside::runtime::{setup_tracing, OrderingSystem};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = Config::load().map_err(|e| e.to_string())?;
    let system = OrderingSystem::new(&config).map_err(|e| e.to_string())?;
    let app = api::router(system.state());

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| format!("Failed to bind {address}: {e}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| e.to_string())?;

    system.shutdown().await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
