// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! HTTP server exposing the netdiag diagnostics handler.
//!
//! Wires the SQLite user directory and the tokio process launcher into a
//! [`Diagnostics`] handler and serves it over axum with graceful shutdown.

mod logging;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use netdiag_core::{AppConfig, Diagnostics, SqliteDirectory, TokioLauncher};

pub use logging::init_logging;
pub use routes::router;

/// Builds the diagnostics handler from configuration with the production
/// collaborators: the SQLite directory and the tokio launcher.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or its schema cannot
/// be created.
pub fn build_diagnostics(config: &AppConfig) -> anyhow::Result<Arc<Diagnostics>> {
    let directory = SqliteDirectory::open(&config.store.path)
        .with_context(|| format!("failed to open user directory at {}", config.store.path))?;
    directory
        .init_schema()
        .context("failed to initialize user directory schema")?;

    Ok(Arc::new(Diagnostics::new(
        Arc::new(directory),
        Arc::new(TokioLauncher),
        config,
    )))
}

/// Run the HTTP server.
///
/// Binds the configured address, serves the diagnostics router, and shuts
/// down gracefully on Ctrl+C.
pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let diag = build_diagnostics(config)?;
    let app = router(diag);

    let host = &config.server.host;
    let port = config.server.port;

    // Handle both IPv4 and IPv6 addresses
    let addr: SocketAddr = if host.contains(':') {
        // IPv6 address - needs brackets
        format!("[{host}]:{port}")
    } else {
        // IPv4 address or hostname
        format!("{host}:{port}")
    }
    .parse()
    .with_context(|| format!("invalid bind address {host}:{port}"))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("netdiag listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
            tracing::info!("Received Ctrl+C, shutting down gracefully");
        })
        .await?;

    Ok(())
}
