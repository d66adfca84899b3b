//! imgserver - An HTTP thumbnail server
//!
//! Renders source images at requested sizes and keeps the results in a
//! byte-bounded cache invalidated by source modification time.

use anyhow::{bail, Context};
use clap::Parser;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgserver::api::create_router;
use imgserver::{spawn_sweep_task, AppState, Config};

/// Main entry point for the image server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Parse configuration from flags and environment
/// 3. Create cache, image directory and renderer
/// 4. Start background stale sweep task
/// 5. Start HTTP server on configured address
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgserver=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    if !config.image_dir.is_dir() {
        bail!("{} is not a directory", config.image_dir.display());
    }
    info!(
        "Configuration loaded: image_dir={}, cache_size={}, jpeg_quality={}, sweep_interval={}s",
        config.image_dir.display(),
        config.cache_size,
        config.jpeg_quality,
        config.sweep_interval
    );

    let state = AppState::from_config(&config);

    let sweep_handle = if config.sweep_interval > 0 {
        Some(spawn_sweep_task(
            state.cache.clone(),
            state.images.clone(),
            config.sweep_interval,
        ))
    } else {
        info!("Stale sweep disabled");
        None
    };

    let app = create_router(state);

    let addr = config
        .socket_addr()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Sweep task aborted");
    }
}
