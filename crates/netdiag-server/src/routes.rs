// SPDX-License-Identifier: Apache-2.0

//! HTTP routes for the diagnostics service.
//!
//! One endpoint does the work: `GET /diag` with optional `user` and `host`
//! query parameters. The handler hands both to [`Diagnostics`] and returns
//! the accumulated body as plain text. Collaborator failures have already
//! been reduced to fixed generic lines by the time they reach this layer,
//! so every request that parses answers 200.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::Router;

use netdiag_core::{DiagParams, Diagnostics};

/// Builds the service router around a shared handler.
///
/// Takes the handler as state so tests can inject fake collaborators.
pub fn router(diag: Arc<Diagnostics>) -> Router {
    Router::new()
        .route("/diag", get(serve_diag))
        .route("/health", get(health))
        .with_state(diag)
}

/// `GET /diag?user=<name>&host=<host>` - run the requested operations and
/// render their results as plain text.
async fn serve_diag(
    State(diag): State<Arc<Diagnostics>>,
    Query(params): Query<DiagParams>,
) -> String {
    diag.handle(&params).await
}

/// `GET /health` - liveness probe.
async fn health() -> &'static str {
    "ok\n"
}
