//! GlobalOpts-aware wrappers over `wallinfo_config`.
//!
//! Resolves which files to use and applies flag overrides on top of the
//! loaded settings.

use std::path::PathBuf;
use std::time::Duration;

use wallinfo_config::{Config, load_config_from, parse_timeout_secs};
use wallinfo_core::ConnectionRegistry;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Settings plus the files they were resolved from.
#[derive(Debug)]
pub struct Context {
    pub config_path: PathBuf,
    pub config: Config,
    pub connections_path: PathBuf,
    timeout_flag: Option<String>,
}

impl Context {
    /// Load settings from `--config` (or the platform path) and environment.
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let config_path = settings_path(global);
        let config = load_config_from(&config_path)?;
        let connections_path = global
            .connections
            .clone()
            .unwrap_or_else(|| config.connections_path(&config_path));

        tracing::debug!(
            config = %config_path.display(),
            connections = %connections_path.display(),
            "settings loaded"
        );

        Ok(Self {
            config_path,
            config,
            connections_path,
            timeout_flag: global.timeout.clone(),
        })
    }

    /// Per-fetch budget: `--timeout` (parsed leniently), then settings.
    pub fn timeout(&self) -> Duration {
        self.timeout_flag
            .as_deref()
            .map_or_else(|| self.config.timeout(), |raw| {
                Duration::from_secs(parse_timeout_secs(raw))
            })
    }

    pub fn registry(&self) -> Result<ConnectionRegistry, CliError> {
        Ok(wallinfo_config::load_connections(&self.connections_path)?)
    }

    pub fn save_registry(&self, registry: &ConnectionRegistry) -> Result<(), CliError> {
        Ok(wallinfo_config::save_connections(
            &self.connections_path,
            registry,
        )?)
    }
}

/// `--config` if given, else the platform config path.
pub fn settings_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(wallinfo_config::config_path)
}
