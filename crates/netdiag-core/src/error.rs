// SPDX-License-Identifier: Apache-2.0

//! Error types for netdiag.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.
//!
//! Every variant is recovered at the request-handler boundary and surfaced to
//! HTTP callers only as a fixed generic line; the detail carried here is for
//! logs, never for response bodies.

use thiserror::Error;

/// Errors that can occur while serving a diagnostics request.
#[derive(Error, Debug)]
pub enum DiagError {
    /// Input failed the allow-pattern or a length bound. No external call
    /// was made for the rejected value.
    #[error("input rejected: {reason}")]
    ValidationRejected {
        /// Why the input was rejected.
        reason: String,
    },

    /// The user directory query failed (connection, prepare, bind, or row
    /// decode).
    #[error("data store error: {message}")]
    DataStore {
        /// Driver error detail.
        message: String,
    },

    /// The probe process could not be launched, exited abnormally, or
    /// exceeded its execution timeout.
    #[error("process error: {message}")]
    Process {
        /// Launcher error detail.
        message: String,
    },

    /// Configuration file or environment error.
    #[error("configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },
}

impl From<rusqlite::Error> for DiagError {
    fn from(err: rusqlite::Error) -> Self {
        DiagError::DataStore {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for DiagError {
    fn from(err: config::ConfigError) -> Self {
        DiagError::Config {
            message: err.to_string(),
        }
    }
}
