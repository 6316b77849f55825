//! Source adapters for the parliamentary document portals.
//!
//! Each adapter encapsulates how to query one portal, how to paginate it,
//! and how to deserialize raw responses into question records. All of that
//! is hidden behind the [`Source`] trait, whose single method returns one
//! flat stream of records.
//!
//! # Supported Portals
//!
//! | Portal | Module | Pagination | Record date |
//! |--------|--------|------------|-------------|
//! | Lok Sabha archive | [`loksabha`] | page envelope with row count, fan-out per page | tabling date |
//! | Rajya Sabha search | [`rajyasabha`] | single response per term | answer date |
//!
//! # Merge Semantics
//!
//! Adapters yield records in completion order, not request order: every
//! pagination unit runs as its own concurrent request and whichever
//! response lands first is deserialized and yielded first. Nothing
//! downstream may rely on ordering. A failed page or term surfaces as an
//! `Err` item in the stream and does not abort its siblings.
//!
//! Streams are single-traversal: the runner consumes each one exactly once
//! per run.

use futures::stream::BoxStream;

use crate::errors::ArchiveError;
use crate::models::Question;

pub mod loksabha;
pub mod rajyasabha;

pub use loksabha::Loksabha;
pub use rajyasabha::Rajyasabha;

/// One item of a scrape stream: a validated record, or the error that kept
/// a record, page, or term group out of the run.
pub type ScrapeResult = Result<Box<dyn Question>, ArchiveError>;

/// A portal adapter.
pub trait Source: Send + Sync {
    /// Stable tag used in archive filenames and logs.
    fn tag(&self) -> &'static str;

    /// Scrape every record matching `terms` into one flat lazy stream.
    fn scrape(&self, terms: Vec<String>) -> BoxStream<'static, ScrapeResult>;
}
