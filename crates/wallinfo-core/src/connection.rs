// ── Connection descriptor ──
//
// One named external data source: where to read it, how to authenticate,
// and which grammar pulls a value out of the response. The serde shape is
// the persisted connections file: a flat JSON array of PascalCase records.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use wallinfo_source::{AuthType, Credentials, HttpMethod, Source};

/// Selects the extraction grammar applied to a fetched body.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ContentType {
    /// Dot-separated key path through JSON objects.
    #[default]
    #[serde(alias = "JSON", alias = "Json")]
    Json,
    /// First match of a multi-line regular expression.
    #[serde(alias = "TEXT", alias = "Text")]
    Text,
}

/// A named connection, persisted as one record of the connections file.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Connection {
    /// Unique key; templates reference it as `{API:<name>}`.
    pub name: String,
    /// File path, `cmd://<command>`, or HTTP(S) URL.
    pub url: String,
    pub method: HttpMethod,
    pub auth_type: AuthType,
    pub username: String,
    /// Password (Basic) or token (Bearer).
    #[serde(rename = "PasswordOrToken")]
    pub secret: String,
    /// Used when `content_type` is `json`.
    #[serde(rename = "JsonKey")]
    pub json_path: String,
    pub content_type: ContentType,
    /// Used when `content_type` is `text`.
    pub regex_pattern: String,
}

impl Connection {
    /// A GET connection with no auth and JSON pass-through.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Extract with a JSON key path.
    pub fn with_json_path(mut self, path: impl Into<String>) -> Self {
        self.content_type = ContentType::Json;
        self.json_path = path.into();
        self
    }

    /// Extract with a regular expression.
    pub fn with_regex(mut self, pattern: impl Into<String>) -> Self {
        self.content_type = ContentType::Text;
        self.regex_pattern = pattern.into();
        self
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth_type = AuthType::Basic;
        self.username = username.into();
        self.secret = password.into();
        self
    }

    pub fn with_bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.auth_type = AuthType::Bearer;
        self.secret = token.into();
        self
    }

    /// The literal template tag for this connection.
    pub fn tag(&self) -> String {
        format!("{{API:{}}}", self.name)
    }

    /// The selector matching `content_type`: key path or pattern.
    pub fn selector(&self) -> &str {
        match self.content_type {
            ContentType::Json => &self.json_path,
            ContentType::Text => &self.regex_pattern,
        }
    }

    /// Credentials for HTTP sources, with the secret wrapped.
    pub fn credentials(&self) -> Credentials {
        Credentials::from_parts(
            self.auth_type,
            &self.username,
            SecretString::from(self.secret.clone()),
        )
    }

    /// Classify the location. Touches the filesystem (existence check).
    pub fn source(&self) -> Source {
        Source::detect(&self.url, self.method, self.credentials())
    }

    /// Whether a secret still has to be supplied from elsewhere.
    pub fn needs_secret(&self) -> bool {
        self.auth_type != AuthType::None && self.secret.is_empty()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("method", &self.method)
            .field("auth_type", &self.auth_type)
            .field("username", &self.username)
            .field("secret", &if self.secret.is_empty() { "" } else { "****" })
            .field("json_path", &self.json_path)
            .field("content_type", &self.content_type)
            .field("regex_pattern", &self.regex_pattern)
            .finish()
    }
}
