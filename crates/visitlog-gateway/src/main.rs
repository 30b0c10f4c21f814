use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use visitlog_core::{DomainIndex, SystemClock, VisitService};
use visitlog_gateway::cli::{StorageBackendArg, CLI};
use visitlog_gateway::{server, AppState};
use visitlog_storage::{InMemoryDomainIndex, RedisDomainIndex};

fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    let telemetry = visitlog_telemetry::init(&config.telemetry_config())?;

    // One worker thread: requests interleave only at await points.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let result = runtime.block_on(run(config));
    drop(runtime);

    if let Err(e) = &result {
        let message = format!("{e:#}");
        error!(error = %message, "gateway exited with error");
    }
    telemetry.shutdown();
    result
}

async fn run(config: CLI) -> anyhow::Result<()> {
    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        "starting visitlog gateway"
    );

    match config.storage {
        StorageBackendArg::Redis => {
            // Never bind the listener without a working store.
            let index = RedisDomainIndex::connect(&config.redis_url, config.redis_key.as_str())
                .await
                .context("failed to connect to redis")?;
            let index = Arc::new(index);

            run_server(config.listen_addr, index.clone()).await?;

            match Arc::try_unwrap(index) {
                Ok(index) => index.close(),
                Err(_) => warn!("redis index still referenced at shutdown"),
            }
        }
        StorageBackendArg::InMemory => {
            run_server(config.listen_addr, Arc::new(InMemoryDomainIndex::new())).await?;
        }
    }

    info!("Server stopped.");
    Ok(())
}

async fn run_server(listen_addr: SocketAddr, index: Arc<dyn DomainIndex>) -> anyhow::Result<()> {
    let visits = VisitService::new(index, Arc::new(SystemClock));

    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;

    server::serve(listener, AppState::new(visits), server::shutdown_signal()).await?;
    Ok(())
}
