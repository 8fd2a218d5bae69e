// SPDX-License-Identifier: Apache-2.0

//! Binary entry point for the netdiag HTTP server.

use anyhow::{Context, Result};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    netdiag_server::init_logging();

    let config = netdiag_core::load_config().context("Failed to load configuration")?;
    debug!("Configuration loaded successfully");

    netdiag_server::run(&config).await
}
