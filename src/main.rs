//! # Parliament Archive
//!
//! Scrapes parliamentary question records from the Lok Sabha and Rajya
//! Sabha document portals, keeps the ones recent enough to matter, and
//! archives their PDF attachments to a dated Google Drive folder.
//!
//! ## Usage
//!
//! ```sh
//! parliament_archive -t "mental health" -t suicide \
//!     --parent-folder <drive-folder-id>
//! ```
//!
//! ## Architecture
//!
//! The application is a single concurrent pipeline:
//! 1. **Scraping**: each portal adapter fans out one request per
//!    pagination unit and merges results in completion order
//! 2. **Filtering**: records older than the recency threshold are skipped
//! 3. **Fetching**: qualifying records have their PDF downloaded inline
//! 4. **Archival**: uploads run as independent tasks, bounded by a
//!    semaphore, all joined before the run is considered complete

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod cloud;
mod errors;
mod fetch;
mod models;
mod runner;
mod scrapers;
mod transport;

use cli::{Cli, SourceKind};
use cloud::{CloudArchive, GoogleDrive};
use fetch::{FetchDocuments, HttpFetcher};
use runner::Runner;
use scrapers::{Loksabha, Rajyasabha, Source};
use transport::Transport;

/// Request timeout for page-level portal calls. Document downloads use a
/// separate untimed client.
const PAGE_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("archive run starting up");

    let args = Cli::parse();
    debug!(
        ?args.terms,
        threshold_days = args.threshold_days,
        upload_concurrency = args.upload_concurrency,
        "Parsed CLI arguments"
    );

    let transport = Transport::new(Some(PAGE_TIMEOUT))?;
    let cloud: Arc<dyn CloudArchive> = Arc::new(GoogleDrive::new(args.drive_token.clone())?);
    let fetcher: Arc<dyn FetchDocuments> = Arc::new(HttpFetcher::new()?);

    let sources: Vec<Arc<dyn Source>> = args
        .selected_sources()
        .into_iter()
        .map(|kind| match kind {
            SourceKind::Loksabha => Arc::new(Loksabha::new(transport.clone())) as Arc<dyn Source>,
            SourceKind::Rajyasabha => Arc::new(Rajyasabha::new(transport.clone())),
        })
        .collect();
    info!(count = sources.len(), "Sources configured");

    let runner = Runner::new(
        args.terms,
        cloud,
        fetcher,
        chrono::Duration::days(args.threshold_days),
        args.parent_folder,
        args.upload_concurrency,
    );

    let report = runner.run_all(&sources).await?;

    let elapsed = start_time.elapsed();
    info!(
        kept = report.kept,
        archived = report.archived,
        upload_failures = report.upload_failures,
        fetch_failures = report.fetch_failures,
        record_errors = report.record_errors,
        failed_sources = report.failed_sources,
        ?elapsed,
        "Run complete"
    );
    println!(
        "{} questions matched, {} documents archived in {:.2}s.",
        report.kept,
        report.archived,
        elapsed.as_secs_f64()
    );

    Ok(())
}
