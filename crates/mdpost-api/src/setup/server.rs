//! Server startup and graceful shutdown

use anyhow::{Context, Result};
use axum::Router;
use mdpost_core::constants::MAX_MARKDOWN_FILE_SIZE;
use mdpost_core::Config;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;

/// Bind the configured port and serve until SIGINT or SIGTERM.
///
/// In-flight uploads are allowed to finish; their spooled files are removed as usual.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.base.server_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        addr = %addr,
        backend = %config.cms.backend,
        max_markdown_bytes = MAX_MARKDOWN_FILE_SIZE,
        max_image_bytes = config.import.max_image_size_bytes,
        "Markdown upload service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let signal = wait_for_shutdown().await;
            tracing::info!(signal, "Stopping; draining in-flight uploads");
        })
        .await
        .context("Server terminated unexpectedly")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves with the name of the signal that asked us to stop.
///
/// # Panics
/// If the signal handlers cannot be installed.
async fn wait_for_shutdown() -> &'static str {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
