// Fetcher: dispatches a classified `Source` to its transport.
//
// `SourceFetcher` is the seam the template renderer is generic over, so
// tests can count or fake fetches without touching the network.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::Error;
use crate::source::Source;
use crate::transport::TransportConfig;
use crate::{command, file, http};

/// Something that can turn a [`Source`] into raw text within a time budget.
pub trait SourceFetcher {
    fn fetch(
        &self,
        source: &Source,
        timeout: Duration,
    ) -> impl Future<Output = Result<String, Error>> + Send;
}

/// The real fetcher: local files, shell commands, and HTTP via reqwest.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: reqwest::Client,
}

impl Fetcher {
    /// Create a fetcher whose HTTP client is built from `transport`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }
}

impl SourceFetcher for Fetcher {
    async fn fetch(&self, source: &Source, timeout: Duration) -> Result<String, Error> {
        debug!(kind = %source.kind(), target = %source.target(), "fetching source");

        match source {
            Source::File(path) => file::read(path, timeout).await,
            Source::Command(line) => command::run(line, timeout).await,
            Source::Http(request) => http::request(&self.http, request, timeout).await,
        }
    }
}
