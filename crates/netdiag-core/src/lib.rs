// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # Netdiag Core
//!
//! Core library for netdiag - a small diagnostics service that looks up a
//! username in a user directory and probes a host for reachability.
//!
//! Both operations take untrusted request parameters. The central contract
//! of this crate is that a parameter value can only ever change the *data*
//! of a downstream call, never its *structure*: usernames travel to SQLite
//! as bound parameters of a fixed query template, and hosts - after passing
//! a strict allow-pattern - become one discrete element of a fixed argument
//! vector, with no shell in between.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use netdiag_core::{Diagnostics, DiagParams, SqliteDirectory, TokioLauncher, load_config};
//!
//! # async fn example() -> netdiag_core::Result<()> {
//! let config = load_config()?;
//!
//! let directory = SqliteDirectory::open(&config.store.path)?;
//! directory.init_schema()?;
//!
//! let diag = Diagnostics::new(Arc::new(directory), Arc::new(TokioLauncher), &config);
//!
//! let params = DiagParams {
//!     user: Some("alice".to_string()),
//!     host: Some("127.0.0.1".to_string()),
//! };
//! let body = diag.handle(&params).await;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration loading and paths
//! - [`error`] - Error types
//! - [`handler`] - The request handler composing both operations
//! - [`probe`] - Process launching with a discrete argument vector
//! - [`store`] - Parameterized user directory lookup
//! - [`validate`] - Host allow-pattern and length bounds

pub mod config;
pub mod error;
pub mod handler;
pub mod probe;
pub mod store;
pub mod validate;

// ============================================================================
// Error Handling
// ============================================================================

pub use error::DiagError;

/// Convenience Result type for netdiag operations.
///
/// This is equivalent to `std::result::Result<T, DiagError>`.
pub type Result<T> = std::result::Result<T, DiagError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AppConfig, LimitsConfig, ProbeConfig, ServerConfig, StoreConfig, config_dir,
    config_file_path, load_config,
};

// ============================================================================
// Request Handling
// ============================================================================

pub use handler::{DB_ERROR_LINE, DiagParams, Diagnostics, EXEC_FAILED_LINE};

// ============================================================================
// Collaborator Seams
// ============================================================================

pub use probe::{ProcessLauncher, TokioLauncher};
pub use store::{SqliteDirectory, UserDirectory, UserRow};

// ============================================================================
// Validation
// ============================================================================

pub use validate::{validate_host, validate_user};
