// SPDX-License-Identifier: Apache-2.0

//! The diagnostics request handler.
//!
//! Composes the two collaborator seams into one request flow: user lookup
//! first, host probe second, each failure isolated to its own section of the
//! response. Parameter values only ever reach a collaborator as bound query
//! data or as one discrete argv element; they never change the structure of
//! a query or a command line.
//!
//! Collaborator failures are recovered here and rendered as fixed generic
//! lines. Driver and launcher detail goes to the log, never to the caller.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::config::{AppConfig, LimitsConfig, ProbeConfig};
use crate::probe::ProcessLauncher;
use crate::store::UserDirectory;
use crate::validate::{validate_host, validate_user};

/// Generic line rendered when the user lookup fails.
pub const DB_ERROR_LINE: &str = "DB error";

/// Generic line rendered when the host probe fails to launch, exits
/// abnormally, or times out.
pub const EXEC_FAILED_LINE: &str = "Exec failed";

/// Query parameters accepted by the diagnostics endpoint. Both are optional;
/// an absent parameter means its operation is not requested.
#[derive(Debug, Default, Deserialize)]
pub struct DiagParams {
    /// Username to look up in the user directory.
    pub user: Option<String>,
    /// Host to probe for reachability.
    pub host: Option<String>,
}

/// Request handler wiring the user directory and process launcher together.
///
/// Immutable after construction; concurrent requests share it behind an
/// `Arc` without any cross-request mutable state.
pub struct Diagnostics {
    directory: Arc<dyn UserDirectory>,
    launcher: Arc<dyn ProcessLauncher>,
    probe: ProbeConfig,
    limits: LimitsConfig,
    query_timeout: Duration,
}

impl Diagnostics {
    /// Creates a handler from the given collaborators and configuration.
    #[must_use]
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        launcher: Arc<dyn ProcessLauncher>,
        config: &AppConfig,
    ) -> Self {
        Self {
            directory,
            launcher,
            probe: config.probe.clone(),
            limits: config.limits,
            query_timeout: Duration::from_secs(config.store.query_timeout_seconds),
        }
    }

    /// Serves one request: data lookup, then host probe, in that order.
    ///
    /// The probe runs regardless of the lookup's outcome. Returns the
    /// accumulated response body.
    #[instrument(skip(self, params))]
    pub async fn handle(&self, params: &DiagParams) -> String {
        let mut lines = Vec::new();

        if let Some(user) = params.user.as_deref() {
            lines.extend(self.handle_data_lookup(user).await);
        }
        if let Some(host) = params.host.as_deref() {
            lines.extend(self.handle_host_probe(host).await);
        }

        let mut body = lines.join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        body
    }

    /// Looks up `user` in the directory and renders one `User: <name>` line
    /// per matching row.
    ///
    /// The value is bound as a single data argument to the fixed query
    /// template; a store failure or timeout renders exactly [`DB_ERROR_LINE`].
    #[instrument(skip(self, user), fields(user_len = user.len()))]
    pub async fn handle_data_lookup(&self, user: &str) -> Vec<String> {
        if let Err(e) = validate_user(user, self.limits.max_user_len) {
            info!(error = %e, "user parameter rejected");
            return vec![e.to_string()];
        }

        match tokio::time::timeout(self.query_timeout, self.directory.lookup(user)).await {
            Ok(Ok(rows)) => rows
                .into_iter()
                .map(|row| format!("User: {}", row.username))
                .collect(),
            Ok(Err(e)) => {
                warn!(error = %e, "user lookup failed");
                vec![DB_ERROR_LINE.to_string()]
            }
            Err(_) => {
                warn!(timeout_s = self.query_timeout.as_secs(), "user lookup timed out");
                vec![DB_ERROR_LINE.to_string()]
            }
        }
    }

    /// Probes `host` and renders the probe's stdout lines verbatim.
    ///
    /// The value must pass the allow-pattern before any process is launched;
    /// a rejected value renders the rejection line and launches nothing. The
    /// validated host is appended as one discrete argv element after the
    /// fixed arguments.
    #[instrument(skip(self, host), fields(host_len = host.len()))]
    pub async fn handle_host_probe(&self, host: &str) -> Vec<String> {
        if let Err(e) = validate_host(host, self.limits.max_host_len) {
            info!(error = %e, "host parameter rejected");
            return vec![e.to_string()];
        }

        let mut argv = self.probe.args.clone();
        argv.push(host.to_string());
        let timeout = Duration::from_secs(self.probe.timeout_seconds);

        match self.launcher.run(&self.probe.program, &argv, timeout).await {
            Ok(lines) => lines,
            Err(e) => {
                warn!(error = %e, "host probe failed");
                vec![EXEC_FAILED_LINE.to_string()]
            }
        }
    }
}
