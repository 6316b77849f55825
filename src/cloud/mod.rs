//! Cloud archive port: the storage capability consumed by the runner.
//!
//! The runner only needs two operations, folder creation and file upload,
//! so that is the whole contract. [`drive`] provides the Google Drive
//! implementation; tests substitute counting stubs.

use async_trait::async_trait;

use crate::errors::Result;
use crate::fetch::UploadableFile;

pub mod drive;

pub use drive::GoogleDrive;

/// Abstract object-storage capability.
///
/// Idempotency of [`create_folder`] is not assumed; the runner guarantees
/// at most one call per run by memoizing the returned id.
///
/// [`create_folder`]: CloudArchive::create_folder
#[async_trait]
pub trait CloudArchive: Send + Sync {
    /// Create a folder under `parent` and return its id.
    async fn create_folder(&self, name: &str, parent: &str) -> Result<String>;

    /// Store `file` inside the folder with id `folder`.
    ///
    /// No return value contract beyond success or failure.
    async fn upload_file(&self, file: UploadableFile, folder: &str) -> Result<()>;
}
