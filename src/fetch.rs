//! Document fetching: turns a question's PDF URL into an uploadable file.
//!
//! Downloads intentionally run with no timeout ceiling. Annexure PDFs can
//! be tens of megabytes served from slow hosts, and a deadline would
//! truncate them; a hung download is the lesser risk here.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::errors::{ArchiveError, Result};
use crate::transport::Transport;

/// Fallback mimetype when the URL extension is unknown. The portals serve
/// PDFs almost exclusively.
const DEFAULT_MIMETYPE: &str = "application/pdf";

/// A file ready to be handed to the cloud archive.
///
/// Immutable value object produced by a [`FetchDocuments`] implementation
/// and consumed exactly once by an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadableFile {
    /// Name the file will carry in the archive.
    pub name: String,
    /// Mimetype guessed from the source URL, `application/pdf` if unknown.
    pub mimetype: String,
    /// Raw payload.
    pub data: Vec<u8>,
}

impl UploadableFile {
    /// Wrap raw bytes with a name, guessing the mimetype from `source_url`.
    pub fn new(data: Vec<u8>, name: impl Into<String>, source_url: &str) -> Self {
        let mimetype = mime_guess::from_path(source_url)
            .first()
            .map(|m| m.to_string())
            .unwrap_or_else(|| DEFAULT_MIMETYPE.to_string());
        Self {
            name: name.into(),
            mimetype,
            data,
        }
    }
}

/// Capability to retrieve a record's document as an [`UploadableFile`].
///
/// The runner depends on this trait rather than on a concrete HTTP client
/// so the upload orchestration can be exercised against stubs.
#[async_trait]
pub trait FetchDocuments: Send + Sync {
    /// Retrieve `url` and wrap the body under `filename`.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::Transport`] when the GET fails, and
    /// [`ArchiveError::EmptyDocument`] when the body is zero bytes, which
    /// usually means the portal's link has rotted.
    async fn fetch(&self, url: &str, filename: &str) -> Result<UploadableFile>;
}

/// HTTP implementation of [`FetchDocuments`].
pub struct HttpFetcher {
    http: Transport,
}

impl HttpFetcher {
    /// Build a fetcher with its own untimed transport.
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: Transport::new(None)?,
        })
    }
}

#[async_trait]
impl FetchDocuments for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url, %filename))]
    async fn fetch(&self, url: &str, filename: &str) -> Result<UploadableFile> {
        let data = self.http.get_bytes(url).await?;
        if data.is_empty() {
            return Err(ArchiveError::EmptyDocument {
                record: filename.to_string(),
            });
        }
        debug!(bytes = data.len(), "Fetched document");
        Ok(UploadableFile::new(data, filename, url))
    }
}
