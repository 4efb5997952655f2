//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use wallinfo_config::ConfigError;
use wallinfo_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connections ──────────────────────────────────────────────────
    #[error("Connection '{name}' not found")]
    #[diagnostic(
        code(wallinfo::not_found),
        help("Run: wallinfo connections list to see configured connections")
    )]
    ConnectionNotFound { name: String },

    #[error("Connection '{name}' already exists")]
    #[diagnostic(
        code(wallinfo::conflict),
        help("Use: wallinfo connections update {name} ... to change it")
    )]
    Conflict { name: String },

    #[error("Could not set up the HTTP client: {reason}")]
    #[diagnostic(
        code(wallinfo::transport),
        help("Check [http] ca_cert in your settings, or set [http] insecure = true.")
    )]
    Transport { reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wallinfo::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Could not load settings: {reason}")]
    #[diagnostic(
        code(wallinfo::config),
        help("Settings file: {path}\nCreate a fresh one with: wallinfo config init --force")
    )]
    Config { path: String, reason: String },

    #[error("Could not read connections: {reason}")]
    #[diagnostic(
        code(wallinfo::connections_file),
        help("Fix or remove the file; it must be a JSON array of connection records.")
    )]
    ConnectionsFile { reason: String },

    #[error("Settings file already exists at {path}")]
    #[diagnostic(
        code(wallinfo::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error("Keyring unavailable: {reason}")]
    #[diagnostic(
        code(wallinfo::keyring),
        help("Provide the secret through WALLINFO_SECRET_<NAME> instead.")
    )]
    Keyring { reason: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(wallinfo::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(wallinfo::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::ConfigExists { .. } => exit_code::CONFLICT,
            Self::Transport { .. } => exit_code::CONNECTION,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyName => CliError::Validation {
                field: "name".into(),
                reason: "connection name must not be empty".into(),
            },

            CoreError::DuplicateName { name } => CliError::Conflict { name },

            CoreError::NotFound { name } => CliError::ConnectionNotFound { name },

            CoreError::InvalidScale {
                preview_width,
                preview_height,
            } => CliError::Validation {
                field: "scale".into(),
                reason: format!(
                    "preview surface would be {preview_width}x{preview_height}; \
                     target size and scale must be positive"
                ),
            },

            CoreError::Json(e) => CliError::Json(e),

            CoreError::Source(e) => CliError::Transport {
                reason: e.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },

            ConfigError::Figment(e) => CliError::Config {
                path: e
                    .metadata
                    .as_ref()
                    .and_then(|m| m.source.as_ref())
                    .map_or_else(|| "(environment)".into(), ToString::to_string),
                reason: e.to_string(),
            },

            ConfigError::Serialization(e) => CliError::Config {
                path: wallinfo_config::config_path().display().to_string(),
                reason: e.to_string(),
            },

            e @ ConfigError::Connections { .. } => CliError::ConnectionsFile {
                reason: e.to_string(),
            },

            ConfigError::Keyring(e) => CliError::Keyring {
                reason: e.to_string(),
            },

            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
