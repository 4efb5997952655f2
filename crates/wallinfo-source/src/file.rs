use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::error::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read a whole file as text within `timeout`.
///
/// Invalid UTF-8 is replaced rather than rejected; a leading byte-order
/// mark is dropped.
pub(crate) async fn read(path: &Path, timeout: Duration) -> Result<String, Error> {
    debug!(path = %path.display(), "reading file source");

    let bytes = tokio::time::timeout(timeout, tokio::fs::read(path))
        .await
        .map_err(|_| Error::timeout(timeout))?
        .map_err(|source| Error::File {
            path: path.to_path_buf(),
            source,
        })?;

    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    Ok(String::from_utf8_lossy(body).into_owned())
}
