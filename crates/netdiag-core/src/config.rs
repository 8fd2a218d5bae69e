// SPDX-License-Identifier: Apache-2.0

//! Configuration management for netdiag.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `NETDIAG_`)
//! 2. Config file: `~/.config/netdiag/config.toml`
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Override the probe timeout via environment variable
//! NETDIAG_PROBE__TIMEOUT_SECONDS=2 cargo run
//! ```

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::DiagError;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// User directory (data store) settings.
    pub store: StoreConfig,
    /// Host probe settings.
    pub probe: ProbeConfig,
    /// Input length bounds.
    pub limits: LimitsConfig,
}

/// HTTP server settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// User directory settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path. `:memory:` opens an in-memory database.
    pub path: String,
    /// Caller-visible timeout for a single lookup, in seconds.
    pub query_timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: ":memory:".to_string(),
            query_timeout_seconds: 5,
        }
    }
}

/// Host probe settings.
///
/// The program and its fixed leading arguments are decided here, at
/// configuration time. Request input is never spliced into them; the
/// validated host becomes exactly one additional argv element.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Program to launch.
    pub program: String,
    /// Fixed leading arguments, passed before the host.
    pub args: Vec<String>,
    /// Execution timeout in seconds. The child is killed on expiry.
    pub timeout_seconds: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            program: "ping".to_string(),
            args: vec!["-c".to_string(), "1".to_string()],
            timeout_seconds: 5,
        }
    }
}

/// Input length bounds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum accepted length of the `user` parameter, in characters.
    pub max_user_len: usize,
    /// Maximum accepted length of the `host` parameter, in characters.
    /// Defaults to the RFC 1035 name bound.
    pub max_host_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_user_len: 64,
            max_host_len: 253,
        }
    }
}

/// Returns the netdiag configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/netdiag`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join("netdiag");
    }
    dirs::home_dir()
        .expect("Could not determine home directory - is HOME set?")
        .join(".config")
        .join("netdiag")
}

/// Returns the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application configuration.
///
/// Loads from config file (if exists) and environment variables.
/// Environment variables use the prefix `NETDIAG_` and double underscore
/// for nested keys (e.g., `NETDIAG_SERVER__PORT`).
///
/// # Errors
///
/// Returns `DiagError::Config` if the config file exists but is invalid.
pub fn load_config() -> Result<AppConfig, DiagError> {
    let config_path = config_file_path();

    let config = Config::builder()
        // Load from config file (optional - may not exist)
        .add_source(File::with_name(config_path.to_string_lossy().as_ref()).required(false))
        // Override with environment variables
        .add_source(
            Environment::with_prefix("NETDIAG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn load_config_defaults() {
        // Without any config file or env vars, should return defaults
        let config = load_config().expect("should load with defaults");

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.path, ":memory:");
        assert_eq!(config.probe.program, "ping");
        assert_eq!(config.probe.args, vec!["-c", "1"]);
        assert_eq!(config.probe.timeout_seconds, 5);
        assert_eq!(config.limits.max_user_len, 64);
        assert_eq!(config.limits.max_host_len, 253);
    }

    #[test]
    #[serial]
    fn env_var_overrides_probe_timeout() {
        // set_var is unsafe in edition 2024; #[serial] keeps env tests isolated
        unsafe {
            std::env::set_var("NETDIAG_PROBE__TIMEOUT_SECONDS", "2");
        }
        let config = load_config().expect("should load with env override");
        unsafe {
            std::env::remove_var("NETDIAG_PROBE__TIMEOUT_SECONDS");
        }

        assert_eq!(config.probe.timeout_seconds, 2);
    }

    #[test]
    fn config_dir_ends_with_netdiag() {
        let dir = config_dir();
        assert!(dir.ends_with("netdiag"));
    }
}
