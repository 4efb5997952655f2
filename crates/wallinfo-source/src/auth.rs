use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Error;

/// HTTP verb used for a connection. Requests never carry a body.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum HttpMethod {
    #[default]
    #[serde(rename = "GET", alias = "get", alias = "Get")]
    #[strum(serialize = "GET")]
    Get,
    #[serde(rename = "POST", alias = "post", alias = "Post")]
    #[strum(serialize = "POST")]
    Post,
}

/// Which authorization scheme a connection uses.
///
/// Marker enum (no data) -- the secret material lives in [`Credentials`].
/// This is the shape persisted in the connections file.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum AuthType {
    #[default]
    None,
    Basic,
    Bearer,
}

/// Credentials attached to an HTTP source.
///
/// Each variant carries the secret material needed for its scheme.
#[derive(Debug, Clone, Default)]
pub enum Credentials {
    /// No `Authorization` header.
    #[default]
    None,

    /// `Authorization: Basic base64(username:password)`.
    Basic {
        username: String,
        password: SecretString,
    },

    /// `Authorization: Bearer <token>`.
    Bearer { token: SecretString },
}

impl Credentials {
    /// Build credentials from the persisted auth marker and raw fields.
    pub fn from_parts(auth_type: AuthType, username: &str, secret: SecretString) -> Self {
        match auth_type {
            AuthType::None => Self::None,
            AuthType::Basic => Self::Basic {
                username: username.to_owned(),
                password: secret,
            },
            AuthType::Bearer => Self::Bearer { token: secret },
        }
    }

    /// The marker for this credential set.
    pub fn auth_type(&self) -> AuthType {
        match self {
            Self::None => AuthType::None,
            Self::Basic { .. } => AuthType::Basic,
            Self::Bearer { .. } => AuthType::Bearer,
        }
    }

    /// Encode the `Authorization` header value, if any.
    ///
    /// The returned value is flagged sensitive so it never shows up in
    /// reqwest's debug output.
    pub fn authorization_header(&self) -> Result<Option<HeaderValue>, Error> {
        let raw = match self {
            Self::None => return Ok(None),
            Self::Basic { username, password } => {
                format!("Basic {}", basic_token(username, password.expose_secret()))
            }
            Self::Bearer { token } => format!("Bearer {}", token.expose_secret()),
        };

        let mut value = HeaderValue::from_str(&raw)
            .map_err(|e| Error::InvalidCredentials(format!("{} header: {e}", self.auth_type())))?;
        value.set_sensitive(true);
        Ok(Some(value))
    }
}

/// Standard base64 of the colon-joined credential pair.
fn basic_token(username: &str, password: &str) -> String {
    STANDARD.encode(format!("{username}:{password}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn basic_header_encodes_colon_joined_pair() {
        let creds = Credentials::Basic {
            username: "user".into(),
            password: SecretString::from("pass"),
        };
        let header = creds.authorization_header().unwrap().unwrap();
        assert_eq!(header.to_str().unwrap(), "Basic dXNlcjpwYXNz");
        assert!(header.is_sensitive());
    }

    #[test]
    fn basic_header_with_empty_password_keeps_colon() {
        assert_eq!(basic_token("admin", ""), "YWRtaW46");
    }

    #[test]
    fn bearer_header_uses_token_verbatim() {
        let creds = Credentials::Bearer {
            token: SecretString::from("abc.def.ghi"),
        };
        let header = creds.authorization_header().unwrap().unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer abc.def.ghi");
    }

    #[test]
    fn no_auth_has_no_header() {
        assert!(Credentials::None.authorization_header().unwrap().is_none());
    }

    #[test]
    fn bearer_token_with_newline_is_rejected() {
        let creds = Credentials::Bearer {
            token: SecretString::from("bad\ntoken"),
        };
        assert!(matches!(
            creds.authorization_header(),
            Err(Error::InvalidCredentials(_))
        ));
    }

    #[test]
    fn from_parts_follows_marker() {
        let creds = Credentials::from_parts(AuthType::Basic, "u", SecretString::from("p"));
        assert_eq!(creds.auth_type(), AuthType::Basic);

        let creds = Credentials::from_parts(AuthType::None, "u", SecretString::from("p"));
        assert_eq!(creds.auth_type(), AuthType::None);
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!(HttpMethod::Post.to_string(), "POST");
    }

    #[test]
    fn auth_type_round_trips_through_strings() {
        assert_eq!("bearer".parse::<AuthType>().unwrap(), AuthType::Bearer);
        assert_eq!(AuthType::Basic.to_string(), "Basic");
    }
}
