#![doc = include_str!("../README.md")]

use adder_core::Addition;
use adder_server::{CliArgs, Listener, ServerConfig, server::telemetry::init_telemetry};
use clap::Parser;
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry(config.log_json)?;

    let listener = Listener::start(&config, Addition).await?;
    log_startup_info(&listener, &config);

    let res = listener.run_until(shutdown_signal()).await;
    if let Err(e) = &res {
        tracing::error!("Error during shutdown: {e:?}");
    } else {
        tracing::info!("Service shut down successfully");
    }

    providers.shutdown();
    res
}

fn log_startup_info(listener: &Listener, config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Add server started on {} with full config: {:#?}",
            listener.local_addr(),
            config
        );
    } else {
        tracing::info!(
            "Add server started on port {} ({} concurrent calls)",
            listener.local_addr().port(),
            config.max_concurrent_calls
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
}
