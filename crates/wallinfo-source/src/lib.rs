// wallinfo-source: Raw text acquisition for template connections (file, command, HTTP)

pub mod auth;
mod command;
pub mod error;
pub mod fetcher;
mod file;
mod http;
pub mod source;
pub mod transport;

pub use auth::{AuthType, Credentials, HttpMethod};
pub use error::Error;
pub use fetcher::{Fetcher, SourceFetcher};
pub use source::{COMMAND_PREFIX, HttpSource, Source, SourceKind};
pub use transport::{TlsMode, TransportConfig};
