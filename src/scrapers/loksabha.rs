//! Lok Sabha archive scraper.
//!
//! Queries the full-text search endpoint of the digital archive at
//! `eparlib.nic.in`, which indexes questions per Lok Sabha (chamber
//! session) number. Every search term is crossed with sessions 1 through
//! 17 and each pair is paginated independently: page 0 reveals the total
//! row count, the remaining pages are fetched as one concurrent request
//! each.
//!
//! Record dates are the question's tabling date.

use std::ops::{Range, RangeInclusive};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use futures::future;
use futures::stream::{self, BoxStream, FuturesUnordered, StreamExt};
use itertools::Itertools;
use serde::Deserialize;
use tracing::debug;

use crate::errors::{ArchiveError, Result};
use crate::models::{Question, QuestionNumber};
use crate::scrapers::{ScrapeResult, Source};
use crate::transport::Transport;

const TAG: &str = "loksabha";
const BASE_URL: &str = "https://eparlib.nic.in/restv3/fetch/all";
const PAGE_SIZE: usize = 100;

/// Lok Sabha numbers covered by the archive.
const SESSIONS: RangeInclusive<u8> = 1..=17;

/// Adapter for the Lok Sabha archive portal.
pub struct Loksabha {
    http: Transport,
    page_size: usize,
}

impl Loksabha {
    pub fn new(http: Transport) -> Self {
        Self {
            http,
            page_size: PAGE_SIZE,
        }
    }

    /// Stream of pages for one (term, session) pair, completion order.
    ///
    /// The initial page-0 response carries the row count that determines
    /// how many more pages exist; those are fetched concurrently and
    /// yielded as they land. A failed initial fetch collapses the group to
    /// a single `Err` item.
    fn group_stream(
        &self,
        term: String,
        session: u8,
    ) -> BoxStream<'static, Result<Page>> {
        let http = self.http.clone();
        let page_size = self.page_size;
        let first = Self::fetch_page(http.clone(), term.clone(), session, 0, page_size);

        stream::once(first)
            .flat_map(move |initial| match initial {
                Ok(page) => {
                    debug!(%term, session, rows = page.rows_count, "Initial page fetched");
                    let extra: FuturesUnordered<_> = extra_pages(page.rows_count, page_size)
                        .map(|page_no| {
                            Self::fetch_page(
                                http.clone(),
                                term.clone(),
                                session,
                                page_no,
                                page_size,
                            )
                        })
                        .collect();
                    stream::once(future::ready(Ok(page))).chain(extra).boxed()
                }
                Err(e) => stream::once(future::ready(Err(e))).boxed(),
            })
            .boxed()
    }

    async fn fetch_page(
        http: Transport,
        term: String,
        session: u8,
        page_no: usize,
        page_size: usize,
    ) -> Result<Page> {
        let url = page_url(&term, session, page_no, page_size);
        let body = http.get_text(&url).await?;
        serde_json::from_str(&body).map_err(|e| ArchiveError::SchemaValidation {
            adapter: TAG,
            detail: format!("page envelope: {e}"),
        })
    }
}

impl Source for Loksabha {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn scrape(&self, terms: Vec<String>) -> BoxStream<'static, ScrapeResult> {
        let groups: Vec<_> = terms
            .into_iter()
            .cartesian_product(SESSIONS)
            .map(|(term, session)| self.group_stream(term, session))
            .collect();

        stream::select_all(groups)
            .flat_map(|page| match page {
                Ok(page) => page.into_records(),
                Err(e) => stream::once(future::ready(Err(e))).boxed(),
            })
            .boxed()
    }
}

/// Query URL for one result page.
fn page_url(term: &str, session: u8, page_no: usize, page_size: usize) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("collectionId", "3")
        .append_pair("loksabhaNo", &format!("{session:02}"))
        .append_pair("anyWhere", term)
        .append_pair("start", &(page_no * page_size).to_string())
        .append_pair("rows", &page_size.to_string())
        .finish();
    format!("{BASE_URL}?{query}")
}

/// Page indices still to fetch once page 0 reported `rows_count` rows.
fn extra_pages(rows_count: usize, page_size: usize) -> Range<usize> {
    1..rows_count / page_size
}

/// Response envelope for one result page. Records stay raw JSON so one
/// malformed record cannot sink its page.
#[derive(Debug, Deserialize)]
pub(crate) struct Page {
    #[serde(default)]
    records: Vec<serde_json::Value>,
    #[serde(rename = "rowsCount")]
    rows_count: usize,
}

impl Page {
    fn into_records(self) -> BoxStream<'static, ScrapeResult> {
        stream::iter(self.records.into_iter().map(LsQuestion::from_value)).boxed()
    }
}

/// A question from the Lok Sabha archive.
///
/// `questionNo` is a string on the wire because some numbers carry letters
/// or asterisk markers.
#[derive(Debug, Deserialize)]
pub struct LsQuestion {
    #[serde(rename = "questionNo")]
    number: QuestionNumber,
    #[serde(rename = "title")]
    subject: String,
    #[serde(deserialize_with = "de_tabling_date")]
    date: NaiveDateTime,
    files: Vec<String>,
}

impl LsQuestion {
    fn from_value(raw: serde_json::Value) -> ScrapeResult {
        let question: LsQuestion =
            serde_json::from_value(raw).map_err(|e| ArchiveError::SchemaValidation {
                adapter: TAG,
                detail: e.to_string(),
            })?;
        if question.subject.is_empty() {
            return Err(ArchiveError::SchemaValidation {
                adapter: TAG,
                detail: format!("question {} has an empty title", question.number),
            });
        }
        if question.files.first().map_or(true, |f| f.is_empty()) {
            return Err(ArchiveError::SchemaValidation {
                adapter: TAG,
                detail: format!("question {} has no document file", question.number),
            });
        }
        Ok(Box::new(question))
    }
}

impl Question for LsQuestion {
    fn number(&self) -> &QuestionNumber {
        &self.number
    }

    fn subject(&self) -> &str {
        &self.subject
    }

    fn date(&self) -> NaiveDateTime {
        self.date
    }

    fn url(&self) -> &str {
        self.files.first().map_or("", String::as_str)
    }
}

fn de_tabling_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(serde::de::Error::custom)
}
