use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use tracing::debug;
use url::Url;

use crate::auth::HttpMethod;
use crate::error::Error;
use crate::source::HttpSource;

/// Issue the request described by `source` and return the body as text.
///
/// The body is read regardless of the status code; dashboards often put
/// useful text on error pages and the extractor decides what it means.
pub(crate) async fn request(
    client: &reqwest::Client,
    source: &HttpSource,
    timeout: Duration,
) -> Result<String, Error> {
    let url = Url::parse(&source.url)?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::UnsupportedScheme {
                scheme: other.to_owned(),
            });
        }
    }

    debug!("{} {}", source.method, url);

    let mut builder = match source.method {
        HttpMethod::Get => client.get(url),
        HttpMethod::Post => client.post(url),
    };
    if let Some(value) = source.credentials.authorization_header()? {
        builder = builder.header(AUTHORIZATION, value);
    }

    let resp = builder
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| classify(e, timeout))?;

    let status = resp.status();
    if !status.is_success() {
        debug!(%status, "non-success status, reading body anyway");
    }

    resp.text().await.map_err(|e| classify(e, timeout))
}

/// Fold reqwest's timeout flavour into the crate-wide timeout variant.
fn classify(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::timeout(timeout)
    } else {
        Error::Transport(err)
    }
}
