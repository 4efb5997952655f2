// ── Core error types ──
//
// `CoreError` covers registry bookkeeping, placement preconditions and
// persistence. Extraction failures have their own small taxonomy because
// the renderer turns each of them into a different inline marker.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Registry ─────────────────────────────────────────────────────
    #[error("Connection name must not be empty")]
    EmptyName,

    #[error("Connection '{name}' already exists")]
    DuplicateName { name: String },

    #[error("Connection '{name}' not found")]
    NotFound { name: String },

    // ── Placement ────────────────────────────────────────────────────
    #[error("Invalid scale: preview surface is {preview_width}x{preview_height}")]
    InvalidScale {
        preview_width: u32,
        preview_height: u32,
    },

    // ── Persistence ──────────────────────────────────────────────────
    #[error("Invalid connections data: {0}")]
    Json(#[from] serde_json::Error),

    // ── Source layer (fetcher construction) ──────────────────────────
    #[error(transparent)]
    Source(#[from] wallinfo_source::Error),
}

/// The source text was fetched but could not be interpreted at all.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The body is not valid JSON.
    #[error("JSON path error: {0}")]
    Json(#[source] serde_json::Error),

    /// The configured pattern does not compile.
    #[error("Regex error: {0}")]
    Regex(#[source] regex::Error),
}

/// Why extraction produced no value.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Well-formed input, but the path or pattern did not hit.
    #[error("No match")]
    NoMatch,
}
