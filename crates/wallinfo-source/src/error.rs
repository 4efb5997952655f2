use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `wallinfo-source` crate.
///
/// Every variant is a fetch failure: the source could not produce raw
/// text within its time budget. `wallinfo-core` turns all of them into
/// the same inline `(error)` marker, so the distinctions here exist for
/// logging and for the `connections test` diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Time budget ─────────────────────────────────────────────────
    /// The file read, command, or HTTP call did not finish in time.
    #[error("Source timed out after {budget:?}")]
    Timeout { budget: Duration },

    // ── Local file ──────────────────────────────────────────────────
    /// Reading a local file failed.
    #[error("Failed to read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Shell command ───────────────────────────────────────────────
    /// Spawning or waiting on a shell command failed.
    #[error("Failed to run command `{command}`: {source}")]
    Command {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // ── HTTP ────────────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The location is neither a file, a command, nor a parseable URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The URL parsed, but not as http or https.
    #[error("Unsupported URL scheme '{scheme}'")]
    UnsupportedScheme { scheme: String },

    /// Credentials could not be encoded into an `Authorization` header.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// TLS configuration or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),
}

impl Error {
    /// Returns `true` if the source exceeded its time budget.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Build a timeout error from the budget that was exceeded.
    pub(crate) fn timeout(budget: Duration) -> Self {
        Self::Timeout { budget }
    }
}
