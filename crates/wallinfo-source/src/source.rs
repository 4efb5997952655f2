// ── Source detection ──
//
// A connection's location string is classified exactly once per fetch:
// existing file, then `cmd://` command, then HTTP. The result is a tagged
// variant the fetcher dispatches on.

use std::path::{Path, PathBuf};

use strum::Display;

use crate::auth::{Credentials, HttpMethod};

/// Prefix marking a location as a shell command. Matched case-insensitively.
pub const COMMAND_PREFIX: &str = "cmd://";

/// Which of the three source kinds a location resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SourceKind {
    File,
    Command,
    Http,
}

/// An HTTP endpoint with its verb and credentials.
#[derive(Debug, Clone)]
pub struct HttpSource {
    /// Unparsed URL; parsing happens at fetch time so a bad URL is a
    /// fetch failure rather than a detection failure.
    pub url: String,
    pub method: HttpMethod,
    pub credentials: Credentials,
}

/// A classified data source.
#[derive(Debug, Clone)]
pub enum Source {
    /// Read the whole file as text.
    File(PathBuf),
    /// Run through the platform shell and capture stdout.
    Command(String),
    /// Issue a body-less request and read the response body.
    Http(HttpSource),
}

impl Source {
    /// Classify a location string.
    ///
    /// Detection order is significant: a location naming an existing file
    /// is a file even if it also looks like a URL or starts with `cmd://`.
    pub fn detect(location: &str, method: HttpMethod, credentials: Credentials) -> Self {
        if !location.is_empty() && Path::new(location).is_file() {
            return Self::File(PathBuf::from(location));
        }

        if let Some(command) = strip_command_prefix(location) {
            return Self::Command(command.to_owned());
        }

        Self::Http(HttpSource {
            url: location.to_owned(),
            method,
            credentials,
        })
    }

    /// The kind this source resolved to.
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::File(_) => SourceKind::File,
            Self::Command(_) => SourceKind::Command,
            Self::Http(_) => SourceKind::Http,
        }
    }

    /// Human-readable target for logs: path, command line, or URL.
    pub fn target(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Command(command) => command.clone(),
            Self::Http(http) => http.url.clone(),
        }
    }
}

/// Strip a case-insensitive `cmd://` prefix, returning the command text.
fn strip_command_prefix(location: &str) -> Option<&str> {
    let prefix = location.get(..COMMAND_PREFIX.len())?;
    if prefix.eq_ignore_ascii_case(COMMAND_PREFIX) {
        location.get(COMMAND_PREFIX.len()..)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    fn detect(location: &str) -> Source {
        Source::detect(location, HttpMethod::Get, Credentials::None)
    }

    #[test]
    fn existing_file_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hello").unwrap();
        let location = file.path().to_str().unwrap();

        assert_eq!(detect(location).kind(), SourceKind::File);
    }

    #[test]
    fn missing_file_falls_through_to_http() {
        let source = detect("/definitely/not/here/wallinfo.txt");
        assert_eq!(source.kind(), SourceKind::Http);
    }

    #[test]
    fn directory_is_not_a_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = detect(dir.path().to_str().unwrap());
        assert_eq!(source.kind(), SourceKind::Http);
    }

    #[test]
    fn command_prefix_is_stripped() {
        match detect("cmd://echo hi") {
            Source::Command(cmd) => assert_eq!(cmd, "echo hi"),
            other => panic!("expected command source, got {other:?}"),
        }
    }

    #[test]
    fn command_prefix_is_case_insensitive() {
        match detect("CMD://uptime") {
            Source::Command(cmd) => assert_eq!(cmd, "uptime"),
            other => panic!("expected command source, got {other:?}"),
        }
    }

    #[test]
    fn everything_else_is_http() {
        let source = Source::detect(
            "https://example.com/status",
            HttpMethod::Post,
            Credentials::None,
        );
        match source {
            Source::Http(http) => {
                assert_eq!(http.url, "https://example.com/status");
                assert_eq!(http.method, HttpMethod::Post);
            }
            other => panic!("expected http source, got {other:?}"),
        }
    }

    #[test]
    fn short_locations_do_not_panic() {
        assert_eq!(detect("cmd").kind(), SourceKind::Http);
        assert_eq!(detect("").kind(), SourceKind::Http);
    }

    #[test]
    fn kind_displays_lowercase() {
        assert_eq!(SourceKind::Command.to_string(), "command");
    }
}
