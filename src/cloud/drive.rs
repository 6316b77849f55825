//! Google Drive implementation of the cloud archive port.
//!
//! Talks to the Drive v3 REST API directly: plain JSON for folder
//! creation, a hand-built `multipart/related` body for uploads (the Drive
//! upload endpoint does not accept `multipart/form-data`). Authentication
//! is a pre-minted OAuth bearer token supplied at construction; minting
//! tokens from service-account credentials is the caller's concern.

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::cloud::CloudArchive;
use crate::errors::{ArchiveError, Result};
use crate::fetch::UploadableFile;

use async_trait::async_trait;

const API_BASE: &str = "https://www.googleapis.com";
const FOLDER_MIMETYPE: &str = "application/vnd.google-apps.folder";

/// Boundary for multipart/related upload bodies. Fixed string; the payload
/// parts are JSON and PDF bytes, neither of which embeds it.
const UPLOAD_BOUNDARY: &str = "parliament_archive_upload";

/// Drive v3 client holding a bearer token and a pooled HTTP client.
pub struct GoogleDrive {
    client: reqwest::Client,
    token: String,
    base: String,
}

/// The only field we read back from Drive responses.
#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

impl GoogleDrive {
    /// Build a client for the production API endpoint.
    pub fn new(token: String) -> Result<Self> {
        Self::with_base(token, API_BASE.to_string())
    }

    fn with_base(token: String, base: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ArchiveError::transport("building drive client", e))?;
        Ok(Self { client, token, base })
    }

    /// Frame a metadata JSON part and a media part into one
    /// `multipart/related` body, the shape the Drive upload endpoint
    /// expects.
    fn multipart_body(metadata: &str, mimetype: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::with_capacity(data.len() + metadata.len() + 256);
        body.extend_from_slice(
            format!(
                "--{UPLOAD_BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!("--{UPLOAD_BOUNDARY}\r\nContent-Type: {mimetype}\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{UPLOAD_BOUNDARY}--").as_bytes());
        body
    }
}

#[async_trait]
impl CloudArchive for GoogleDrive {
    #[instrument(level = "info", skip(self))]
    async fn create_folder(&self, name: &str, parent: &str) -> Result<String> {
        let url = format!("{}/drive/v3/files", self.base);
        let metadata = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIMETYPE,
            "parents": [parent],
        });

        let response = self
            .client
            .post(&url)
            .query(&[("fields", "id")])
            .bearer_auth(&self.token)
            .json(&metadata)
            .send()
            .await
            .map_err(|e| ArchiveError::transport(format!("POST {url}"), e))?
            .error_for_status()
            .map_err(|e| ArchiveError::transport(format!("creating folder {name}"), e))?;

        let created: DriveFile = response
            .json()
            .await
            .map_err(|e| ArchiveError::transport("parsing folder metadata", e))?;
        info!(folder = %name, id = %created.id, "Created Drive folder");
        Ok(created.id)
    }

    #[instrument(level = "info", skip(self, file), fields(name = %file.name, bytes = file.data.len()))]
    async fn upload_file(&self, file: UploadableFile, folder: &str) -> Result<()> {
        let url = format!("{}/upload/drive/v3/files", self.base);
        let metadata = serde_json::json!({
            "name": file.name,
            "parents": [folder],
        })
        .to_string();
        let body = Self::multipart_body(&metadata, &file.mimetype, &file.data);

        self.client
            .post(&url)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .bearer_auth(&self.token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={UPLOAD_BOUNDARY}"),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| ArchiveError::transport(format!("POST {url}"), e))?
            .error_for_status()
            .map_err(|e| ArchiveError::transport(format!("uploading {}", file.name), e))?;

        info!(name = %file.name, "Uploaded file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_body_frames_metadata_and_media() {
        let body = GoogleDrive::multipart_body(
            r#"{"name":"loksabha-42.pdf","parents":["folder-1"]}"#,
            "application/pdf",
            b"%PDF-1.4",
        );
        let text = String::from_utf8_lossy(&body);

        assert!(text.starts_with(&format!("--{UPLOAD_BOUNDARY}\r\n")));
        assert!(text.contains("Content-Type: application/json; charset=UTF-8"));
        assert!(text.contains(r#""name":"loksabha-42.pdf""#));
        assert!(text.contains("Content-Type: application/pdf"));
        assert!(text.contains("%PDF-1.4"));
        assert!(text.ends_with(&format!("\r\n--{UPLOAD_BOUNDARY}--")));
    }

    #[test]
    fn test_multipart_body_keeps_binary_payload_intact() {
        let payload = vec![0u8, 159, 146, 150];
        let body = GoogleDrive::multipart_body("{}", "application/pdf", &payload);
        assert!(
            body.windows(payload.len())
                .any(|window| window == payload.as_slice())
        );
    }
}
