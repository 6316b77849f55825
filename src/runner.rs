//! Run orchestration: drives the source adapters, filters for recency,
//! and fans uploads out against the cloud archive.
//!
//! One [`Runner`] owns one run. Its folder id is created lazily on first
//! need and memoized, so concurrent adapters racing on first access still
//! produce exactly one folder-creation call. Uploads are spawned as
//! independent tasks bounded by a semaphore; a failed upload is counted
//! and reported, never allowed to cancel its siblings or abort the
//! consumption loop. `run_one` does not return until every upload it
//! spawned has resolved.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use futures::StreamExt;
use futures::future::join_all;
use tokio::sync::{OnceCell, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

use crate::cloud::CloudArchive;
use crate::errors::{ArchiveError, Result};
use crate::fetch::FetchDocuments;
use crate::scrapers::Source;

/// Per-adapter outcome counters.
#[derive(Debug)]
pub struct SourceReport {
    pub source: &'static str,
    /// Records that passed the recency filter.
    pub kept: usize,
    /// Documents that landed in the archive.
    pub archived: usize,
    pub upload_failures: usize,
    pub fetch_failures: usize,
    /// Records or pages dropped for schema or transport errors.
    pub record_errors: usize,
}

impl SourceReport {
    fn new(source: &'static str) -> Self {
        Self {
            source,
            kept: 0,
            archived: 0,
            upload_failures: 0,
            fetch_failures: 0,
            record_errors: 0,
        }
    }
}

/// Aggregate outcome over every adapter in a run.
///
/// `kept` and `archived` are reported separately on purpose: a run that
/// found 40 records but archived 38 is a partial failure, not a success.
#[derive(Debug, Default)]
pub struct RunReport {
    pub kept: usize,
    pub archived: usize,
    pub upload_failures: usize,
    pub fetch_failures: usize,
    pub record_errors: usize,
    pub failed_sources: usize,
}

impl RunReport {
    fn absorb(&mut self, report: &SourceReport) {
        self.kept += report.kept;
        self.archived += report.archived;
        self.upload_failures += report.upload_failures;
        self.fetch_failures += report.fetch_failures;
        self.record_errors += report.record_errors;
    }
}

/// Orchestrates one archival run across a set of source adapters.
pub struct Runner {
    terms: Vec<String>,
    cloud: Arc<dyn CloudArchive>,
    fetcher: Arc<dyn FetchDocuments>,
    threshold: Duration,
    parent_folder: String,
    folder: OnceCell<String>,
    upload_slots: Arc<Semaphore>,
}

impl Runner {
    pub fn new(
        terms: Vec<String>,
        cloud: Arc<dyn CloudArchive>,
        fetcher: Arc<dyn FetchDocuments>,
        threshold: Duration,
        parent_folder: String,
        upload_concurrency: usize,
    ) -> Self {
        Self {
            terms,
            cloud,
            fetcher,
            threshold,
            parent_folder,
            folder: OnceCell::new(),
            upload_slots: Arc::new(Semaphore::new(upload_concurrency)),
        }
    }

    /// The run folder id, created on first call and memoized.
    ///
    /// Concurrent first callers are serialized by the cell, so the cloud
    /// sees at most one `create_folder` call per run.
    pub async fn folder_id(&self) -> Result<&str> {
        let id = self
            .folder
            .get_or_try_init(|| async {
                let name = folder_name(Local::now().date_naive());
                info!(folder = %name, parent = %self.parent_folder, "Creating run folder");
                self.cloud
                    .create_folder(&name, &self.parent_folder)
                    .await
                    .map_err(|e| ArchiveError::FolderCreation(Box::new(e)))
            })
            .await?;
        Ok(id.as_str())
    }

    /// Scrape one adapter and archive every qualifying document.
    ///
    /// Uploads are spawned as they are discovered and joined before
    /// returning; only folder creation can fail this whole call.
    #[instrument(level = "info", skip_all, fields(source = source.tag()))]
    pub async fn run_one(&self, source: &dyn Source) -> Result<SourceReport> {
        let folder = self.folder_id().await?.to_string();
        let mut report = SourceReport::new(source.tag());
        let mut uploads: JoinSet<Result<()>> = JoinSet::new();
        let mut records = source.scrape(self.terms.clone());
        let now = Local::now().naive_local();

        while let Some(item) = records.next().await {
            let question = match item {
                Ok(question) => question,
                Err(e) => {
                    warn!(error = %e, "Dropping record");
                    report.record_errors += 1;
                    continue;
                }
            };

            if !is_recent(question.date(), now, self.threshold) {
                continue;
            }
            report.kept += 1;

            let filename = format!(
                "{}-{}.{}",
                source.tag(),
                question.number(),
                question.document_extension()
            );
            let file = match self.fetcher.fetch(question.url(), &filename).await {
                Ok(file) => file,
                Err(e) => {
                    warn!(error = %e, record = %question.describe(), "Document fetch failed");
                    report.fetch_failures += 1;
                    continue;
                }
            };

            // Acquiring before the spawn doubles as backpressure: the
            // consumption loop pauses while every slot is in flight.
            let permit = match Arc::clone(&self.upload_slots).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    warn!(name = %filename, "Upload slots closed; skipping upload");
                    report.upload_failures += 1;
                    continue;
                }
            };
            let cloud = Arc::clone(&self.cloud);
            let folder = folder.clone();
            uploads.spawn(async move {
                let _permit = permit;
                cloud.upload_file(file, &folder).await
            });
        }

        while let Some(joined) = uploads.join_next().await {
            match joined {
                Ok(Ok(())) => report.archived += 1,
                Ok(Err(e)) => {
                    warn!(error = %e, "Upload failed");
                    report.upload_failures += 1;
                }
                Err(e) => {
                    error!(error = %e, "Upload task aborted");
                    report.upload_failures += 1;
                }
            }
        }

        info!(
            source = report.source,
            kept = report.kept,
            archived = report.archived,
            upload_failures = report.upload_failures,
            fetch_failures = report.fetch_failures,
            record_errors = report.record_errors,
            "Source run finished"
        );
        Ok(report)
    }

    /// Run every adapter concurrently and aggregate their reports.
    ///
    /// An adapter that fails outright (folder creation is the only such
    /// path) is counted and the others still report; the call errors only
    /// when every adapter failed.
    pub async fn run_all(&self, sources: &[Arc<dyn Source>]) -> Result<RunReport> {
        let results = join_all(sources.iter().map(|s| self.run_one(s.as_ref()))).await;

        let mut report = RunReport::default();
        let mut last_error = None;
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(source_report) => report.absorb(&source_report),
                Err(e) => {
                    error!(source = source.tag(), error = %e, "Source run failed");
                    report.failed_sources += 1;
                    last_error = Some(e);
                }
            }
        }

        if !sources.is_empty() && report.failed_sources == sources.len() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }
        Ok(report)
    }
}

/// Folder name for a run executed on `date`.
fn folder_name(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Recency filter. The boundary is inclusive: a record dated exactly
/// `threshold` ago is kept.
fn is_recent(date: NaiveDateTime, now: NaiveDateTime, threshold: Duration) -> bool {
    now.signed_duration_since(date) <= threshold
}
