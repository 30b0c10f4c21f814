use std::future::Future;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::app::App;
use crate::state::AppState;

/// Serves the gateway on `listener` until `shutdown` resolves.
///
/// In-flight requests are drained first, then every write scheduled by
/// the visit service. The caller may release the store once this returns.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let visits = state.visits().clone();
    info!(listen_addr = %listener.local_addr()?, "Server started");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!(pending = visits.pending_writes(), "Server stopping..");
    visits.drain().await;
    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
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
                warn!(error = %e, "failed to listen for SIGTERM");
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

    info!("shutdown signal received");
}
