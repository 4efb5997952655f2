// ── Template rendering ──
//
// Substitutes built-in facts, then `{API:<name>}` tags. Each referenced
// connection is fetched once per render, in registry order, and every
// failure degrades to an inline marker instead of aborting the render.

use std::time::Duration;

use tracing::{debug, warn};
use wallinfo_source::{SourceFetcher, SourceKind};

use crate::builtins::Builtins;
use crate::connection::{Connection, ContentType};
use crate::error::{ExtractError, ParseError};
use crate::extract::extract;
use crate::registry::ConnectionRegistry;

/// Substituted when the source could not be fetched.
pub const FETCH_ERROR_MARKER: &str = "(error)";
/// Substituted when the body is not JSON.
pub const JSON_PATH_ERROR_MARKER: &str = "(json path error)";
/// Substituted when the pattern does not compile.
pub const REGEX_ERROR_MARKER: &str = "(regex error)";
/// Substituted when the path or pattern found nothing.
pub const NO_MATCH_MARKER: &str = "(no match)";

/// Outcome of resolving one connection.
#[derive(Debug)]
pub enum Resolution {
    /// Extracted, trimmed value.
    Value(String),
    FetchFailed(wallinfo_source::Error),
    ParseFailed(ParseError),
    NoMatch,
}

impl Resolution {
    /// Text that replaces the tag in the rendered output.
    pub fn substitution(&self) -> &str {
        match self {
            Self::Value(value) => value,
            Self::FetchFailed(_) => FETCH_ERROR_MARKER,
            Self::ParseFailed(ParseError::Json(_)) => JSON_PATH_ERROR_MARKER,
            Self::ParseFailed(ParseError::Regex(_)) => REGEX_ERROR_MARKER,
            Self::NoMatch => NO_MATCH_MARKER,
        }
    }

    /// Short status word for tables and logs.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Value(_) => "ok",
            Self::FetchFailed(e) if e.is_timeout() => "timeout",
            Self::FetchFailed(_) => "fetch error",
            Self::ParseFailed(_) => "parse error",
            Self::NoMatch => "no match",
        }
    }

    /// Underlying error message, if the resolution failed with one.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::FetchFailed(e) => Some(e.to_string()),
            Self::ParseFailed(e) => Some(e.to_string()),
            Self::Value(_) | Self::NoMatch => None,
        }
    }
}

impl From<Result<String, ExtractError>> for Resolution {
    fn from(result: Result<String, ExtractError>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(ExtractError::Parse(e)) => Self::ParseFailed(e),
            Err(ExtractError::NoMatch) => Self::NoMatch,
        }
    }
}

/// One referenced connection and how its tag was resolved.
#[derive(Debug)]
pub struct TagResolution {
    pub connection: String,
    pub tag: String,
    pub resolution: Resolution,
}

/// Rendered text plus per-connection diagnostics.
#[derive(Debug)]
pub struct RenderReport {
    pub text: String,
    /// Referenced connections, in registry order.
    pub tags: Vec<TagResolution>,
}

/// A single connection resolved in isolation, keeping the raw body.
#[derive(Debug)]
pub struct ConnectionInspection {
    pub kind: SourceKind,
    /// Raw fetched text; `None` when the fetch failed.
    pub raw: Option<String>,
    pub resolution: Resolution,
}

/// Renders templates against a connection registry.
#[derive(Debug, Clone)]
pub struct TemplateRenderer<F> {
    fetcher: F,
    timeout: Duration,
    note: Option<String>,
}

impl<F: SourceFetcher + Sync> TemplateRenderer<F> {
    pub fn new(fetcher: F, timeout: Duration) -> Self {
        Self {
            fetcher,
            timeout,
            note: None,
        }
    }

    /// Append `Note: <note>` as a final line. Blank notes are ignored.
    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|n| !n.trim().is_empty());
        self
    }

    /// Render `template` to its final text. Never fails.
    pub async fn render(
        &self,
        template: &str,
        builtins: &Builtins,
        registry: &ConnectionRegistry,
    ) -> String {
        self.render_report(template, builtins, registry).await.text
    }

    /// Render and keep the resolution of every referenced connection.
    pub async fn render_report(
        &self,
        template: &str,
        builtins: &Builtins,
        registry: &ConnectionRegistry,
    ) -> RenderReport {
        let text = substitute(template, &builtins.tokens());

        let mut tags = Vec::new();
        for connection in registry.iter() {
            let tag = connection.tag();
            if !text.contains(&tag) {
                continue;
            }
            let resolution = self.resolve(connection).await;
            tags.push(TagResolution {
                connection: connection.name.clone(),
                tag,
                resolution,
            });
        }

        let table: Vec<(&str, &str)> = tags
            .iter()
            .map(|t| (t.tag.as_str(), t.resolution.substitution()))
            .collect();
        let mut rendered = substitute(&text, &table);

        if let Some(note) = &self.note {
            rendered.push_str("\nNote: ");
            rendered.push_str(note);
        }
        rendered.truncate(rendered.trim_end().len());

        debug!(referenced = tags.len(), "template rendered");
        RenderReport {
            text: rendered,
            tags,
        }
    }

    /// Fetch and extract one connection.
    pub async fn resolve(&self, connection: &Connection) -> Resolution {
        self.inspect(connection).await.resolution
    }

    /// Like [`resolve`](Self::resolve), but also returns the raw body.
    pub async fn inspect(&self, connection: &Connection) -> ConnectionInspection {
        let source = connection.source();
        let kind = source.kind();

        let raw = match self.fetcher.fetch(&source, self.timeout).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(connection = %connection.name, %kind, error = %e, "fetch failed");
                return ConnectionInspection {
                    kind,
                    raw: None,
                    resolution: Resolution::FetchFailed(e),
                };
            }
        };

        let extracted = extract(&raw, connection.content_type, connection.selector());
        match &extracted {
            Ok(_) => {
                debug!(connection = %connection.name, %kind, "connection resolved");
            }
            Err(ExtractError::Parse(e)) => {
                warn!(connection = %connection.name, grammar = %grammar(connection), error = %e, "extraction failed");
            }
            Err(ExtractError::NoMatch) => {
                warn!(connection = %connection.name, selector = connection.selector(), "no match");
            }
        }

        ConnectionInspection {
            kind,
            raw: Some(raw),
            resolution: Resolution::from(extracted),
        }
    }
}

fn grammar(connection: &Connection) -> &'static str {
    match connection.content_type {
        ContentType::Json => "json path",
        ContentType::Text => "regex",
    }
}

/// Replace every token in one left-to-right pass.
///
/// All tokens begin with `{`. When several match at the same position the
/// longest wins. Substituted text is never re-scanned.
fn substitute(text: &str, table: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        let (before, tail) = rest.split_at(open);
        out.push_str(before);

        let hit = table
            .iter()
            .filter(|&&(token, _)| !token.is_empty() && tail.starts_with(token))
            .max_by_key(|&&(token, _)| token.len());

        if let Some(&(token, value)) = hit {
            out.push_str(value);
            rest = &tail[token.len()..];
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}
