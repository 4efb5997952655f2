//! Shared configuration for wallinfo.
//!
//! TOML settings layered with figment, the JSON connections file, secret
//! resolution (env + keyring), and translation to `wallinfo_core` types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use wallinfo_core::placement::DEFAULT_PREVIEW_SCALE;
use wallinfo_core::{ConnectionRegistry, CoreError, PlacementRect, TlsMode, TransportConfig};

/// Fallback when a timeout is missing, unparsable, or zero.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Keyring service name for connection secrets.
pub const KEYRING_SERVICE: &str = "wallinfo";

const ENV_PREFIX: &str = "WALLINFO_";
const SECRET_ENV_PREFIX: &str = "WALLINFO_SECRET_";

pub const DEFAULT_TEMPLATE: &str =
    "Host: {hostname}\nUser: {user}\nIP: {ip}\nOS: {os}\nCores: {cores}";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("invalid connections file {}: {source}", .path.display())]
    Connections {
        path: PathBuf,
        #[source]
        source: CoreError,
    },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Per-fetch time budget in whole seconds.
    #[serde(default = "default_timeout", deserialize_with = "lenient::timeout_secs")]
    pub timeout_secs: u64,

    /// Cadence for `watch`.
    #[serde(default = "default_refresh")]
    pub refresh_interval_minutes: u64,

    #[serde(default = "default_template", deserialize_with = "lenient::text")]
    pub template: String,

    /// Appended as a final `Note:` line when set.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub note: Option<String>,

    /// Connections file; defaults to `connections.json` beside the config.
    pub connections_file: Option<PathBuf>,

    #[serde(default)]
    pub placement: PlacementRect,

    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            refresh_interval_minutes: default_refresh(),
            template: default_template(),
            note: None,
            connections_file: None,
            placement: PlacementRect::default(),
            target: TargetConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

/// Full-resolution surface the text is composited onto.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TargetConfig {
    #[serde(default = "default_target_width")]
    pub width: u32,

    #[serde(default = "default_target_height")]
    pub height: u32,

    /// Preview size as a fraction of the target.
    #[serde(default = "default_preview_scale")]
    pub preview_scale: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            width: default_target_width(),
            height: default_target_height(),
            preview_scale: default_preview_scale(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Accept any TLS certificate.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub user_agent: Option<String>,
}

// ── Lenient scalars ─────────────────────────────────────────────────
//
// Environment values arrive typed: `WALLINFO_NOTE=42` is an integer and
// `WALLINFO_TIMEOUT_SECS=abc` is a string. Text settings take any scalar
// as text; a timeout that is not a positive whole number means the default.

mod lenient {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    use super::{DEFAULT_TIMEOUT_SECS, parse_timeout_secs};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Bool(bool),
        Text(String),
        Other(#[allow(dead_code)] IgnoredAny),
    }

    impl Scalar {
        fn into_text(self) -> Option<String> {
            match self {
                Self::Unsigned(n) => Some(n.to_string()),
                Self::Signed(n) => Some(n.to_string()),
                Self::Float(n) => Some(n.to_string()),
                Self::Bool(b) => Some(b.to_string()),
                Self::Text(s) => Some(s),
                Self::Other(_) => None,
            }
        }
    }

    fn scalar_text<E: serde::de::Error>(value: Scalar) -> Result<String, E> {
        value
            .into_text()
            .ok_or_else(|| E::custom("expected text, found a table or array"))
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        scalar_text(Scalar::deserialize(deserializer)?)
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Option::<Scalar>::deserialize(deserializer)?
            .map(scalar_text)
            .transpose()
    }

    pub fn timeout_secs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let secs = match Scalar::deserialize(deserializer)? {
            Scalar::Unsigned(n) if n > 0 => n,
            Scalar::Text(raw) => parse_timeout_secs(&raw),
            _ => DEFAULT_TIMEOUT_SECS,
        };
        Ok(secs)
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_refresh() -> u64 {
    30
}
fn default_template() -> String {
    DEFAULT_TEMPLATE.into()
}
fn default_target_width() -> u32 {
    1920
}
fn default_target_height() -> u32 {
    1080
}
fn default_preview_scale() -> f64 {
    DEFAULT_PREVIEW_SCALE
}

impl Config {
    /// Per-fetch budget; zero means the default.
    pub fn timeout(&self) -> Duration {
        let secs = if self.timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            self.timeout_secs
        };
        Duration::from_secs(secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_minutes.saturating_mul(60))
    }

    /// Non-blank note, if any.
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref().filter(|n| !n.trim().is_empty())
    }

    /// Resolve the connections file relative to the config file's directory.
    pub fn connections_path(&self, config_path: &Path) -> PathBuf {
        let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        match &self.connections_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => dir.join(path),
            None => dir.join("connections.json"),
        }
    }

    /// HTTP transport settings for the fetcher.
    pub fn transport(&self) -> TransportConfig {
        let tls = if self.http.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca) = self.http.ca_cert {
            TlsMode::CustomCa(ca.clone())
        } else {
            TlsMode::System
        };

        let mut transport = TransportConfig {
            tls,
            ..TransportConfig::default()
        };
        if let Some(ref agent) = self.http.user_agent {
            transport.user_agent.clone_from(agent);
        }
        transport
    }
}

/// Parse a whole-seconds timeout, falling back to [`DEFAULT_TIMEOUT_SECS`].
pub fn parse_timeout_secs(raw: &str) -> u64 {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => secs,
        _ => DEFAULT_TIMEOUT_SECS,
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "wallinfo", "wallinfo").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wallinfo");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from defaults, the file at `path`, and environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Connections file ────────────────────────────────────────────────

/// Read the connections file. A missing file is an empty registry.
pub fn load_connections(path: &Path) -> Result<ConnectionRegistry, ConfigError> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no connections file");
            return Ok(ConnectionRegistry::new());
        }
        Err(e) => return Err(e.into()),
    };

    if json.trim().is_empty() {
        return Ok(ConnectionRegistry::new());
    }

    ConnectionRegistry::from_json(&json).map_err(|source| ConfigError::Connections {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the registry as a pretty-printed JSON array.
pub fn save_connections(path: &Path, registry: &ConnectionRegistry) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = registry
        .to_json_pretty()
        .map_err(|source| ConfigError::Connections {
            path: path.to_path_buf(),
            source,
        })?;
    std::fs::write(path, json)?;
    Ok(())
}

// ── Secret resolution ───────────────────────────────────────────────

/// Environment variable consulted for a connection's secret.
///
/// `WALLINFO_SECRET_` plus the name upper-cased, with every character
/// outside `[A-Z0-9]` replaced by `_`.
pub fn secret_env_var(name: &str) -> String {
    let suffix: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{SECRET_ENV_PREFIX}{suffix}")
}

fn keyring_entry(name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{name}/secret"))
}

/// Resolve a connection secret from the environment, then the keyring.
pub fn resolve_secret(name: &str) -> Option<SecretString> {
    // 1. Env var
    if let Ok(val) = std::env::var(secret_env_var(name)) {
        return Some(SecretString::from(val));
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(name) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    None
}

/// Fill in missing secrets from the environment and keyring.
///
/// Only for the in-memory registry used to render; never save the result.
/// Returns how many connections were filled.
pub fn hydrate_secrets(registry: &mut ConnectionRegistry) -> usize {
    hydrate_secrets_with(registry, resolve_secret)
}

/// [`hydrate_secrets`] with a custom lookup.
pub fn hydrate_secrets_with(
    registry: &mut ConnectionRegistry,
    resolve: impl Fn(&str) -> Option<SecretString>,
) -> usize {
    let mut filled = 0;
    for conn in registry.iter_mut().filter(|c| c.needs_secret()) {
        if let Some(secret) = resolve(&conn.name) {
            conn.secret = secret.expose_secret().to_owned();
            filled += 1;
        } else {
            debug!(connection = %conn.name, "no secret available");
        }
    }
    filled
}

/// Store a connection secret in the system keyring.
pub fn store_secret(name: &str, secret: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(name)?.set_password(secret.expose_secret())?;
    Ok(())
}

/// Remove a connection secret from the keyring. Missing entries are fine.
pub fn forget_secret(name: &str) -> Result<(), ConfigError> {
    match keyring_entry(name)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
