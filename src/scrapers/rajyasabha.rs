//! Rajya Sabha document search scraper.
//!
//! The search endpoint at `rsdoc.nic.in` takes a SQL-ish `whereclause`
//! filter and returns every match in one flat JSON array, so pagination is
//! a single request per search term. Terms are matched as substrings of
//! the question title and the question body; rows whose body text is empty
//! or absent are procedural stubs and are dropped before construction.
//!
//! The filter expression interpolates the term, so single quotes are
//! doubled and the whole clause is percent-encoded before it goes on the
//! wire.
//!
//! Record dates are the answer date (`adate`).

use chrono::NaiveDateTime;
use futures::future;
use futures::stream::{self, BoxStream, FuturesUnordered, StreamExt};
use itertools::Itertools;
use serde::Deserialize;
use tracing::debug;

use crate::errors::{ArchiveError, Result};
use crate::models::{Question, QuestionNumber};
use crate::scrapers::{ScrapeResult, Source};
use crate::transport::Transport;

const TAG: &str = "rajyasabha";
const BASE_URL: &str = "https://rsdoc.nic.in/Question/Search_Questions";

/// Row fields the substring filter matches against.
const SEARCH_FIELDS: [&str; 2] = ["qtitle", "qn_text"];

/// Adapter for the Rajya Sabha document search portal.
pub struct Rajyasabha {
    http: Transport,
}

impl Rajyasabha {
    pub fn new(http: Transport) -> Self {
        Self { http }
    }

    /// Fetch and deserialize every row matching one term.
    ///
    /// Returns one result per surviving row; rows that fail validation
    /// stay in the vector as `Err` items so the caller can count them.
    async fn fetch_rows(http: Transport, term: String) -> Result<Vec<ScrapeResult>> {
        let url = search_url(&term);
        let body = http.get_text_json(&url).await?;
        let rows: Vec<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| ArchiveError::SchemaValidation {
                adapter: TAG,
                detail: format!("response envelope: {e}"),
            })?;

        let total = rows.len();
        let results: Vec<ScrapeResult> = rows
            .into_iter()
            .filter(has_body_text)
            .map(RsQuestion::from_value)
            .collect();
        debug!(%term, total, yielded = results.len(), "Fetched search results");
        Ok(results)
    }
}

impl Source for Rajyasabha {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn scrape(&self, terms: Vec<String>) -> BoxStream<'static, ScrapeResult> {
        let fetches: FuturesUnordered<_> = terms
            .into_iter()
            .map(|term| Self::fetch_rows(self.http.clone(), term))
            .collect();

        fetches
            .flat_map(|result| match result {
                Ok(records) => stream::iter(records).boxed(),
                Err(e) => stream::once(future::ready(Err(e))).boxed(),
            })
            .boxed()
    }
}

/// Procedural rows carry no question body; they never have a document
/// worth archiving.
fn has_body_text(row: &serde_json::Value) -> bool {
    row.get("qn_text")
        .and_then(|v| v.as_str())
        .is_some_and(|text| !text.is_empty())
}

/// Substring filter over `fields`, with single quotes in the term doubled.
fn where_clause(term: &str, fields: &[&str]) -> String {
    let escaped = term.replace('\'', "''");
    fields
        .iter()
        .map(|field| format!("{field} LIKE '%{escaped}%'"))
        .join(" OR ")
}

fn search_url(term: &str) -> String {
    let clause = format!("({})", where_clause(term, &SEARCH_FIELDS));
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("whereclause", &clause)
        .finish();
    format!("{BASE_URL}?{query}")
}

/// A question from the Rajya Sabha document search.
///
/// `qno` arrives as a JSON float.
#[derive(Debug, Deserialize)]
pub struct RsQuestion {
    #[serde(rename = "qno")]
    number: QuestionNumber,
    #[serde(rename = "qtitle")]
    subject: String,
    #[serde(rename = "adate")]
    date: NaiveDateTime,
    files: String,
}

impl RsQuestion {
    fn from_value(raw: serde_json::Value) -> ScrapeResult {
        let question: RsQuestion =
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
        if question.files.is_empty() {
            return Err(ArchiveError::SchemaValidation {
                adapter: TAG,
                detail: format!("question {} has no document file", question.number),
            });
        }
        Ok(Box::new(question))
    }
}

impl Question for RsQuestion {
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
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row_json(body_text: &str) -> serde_json::Value {
        serde_json::json!({
            "qno": 1272.0,
            "qtitle": "Shortage of psychiatrists in government hospitals",
            "adate": "2024-02-09T00:00:00",
            "qn_text": body_text,
            "files": "https://rsdoc.nic.in/docs/1272.pdf",
        })
    }

    #[test]
    fn test_where_clause_covers_all_fields() {
        let clause = where_clause("mental health", &SEARCH_FIELDS);
        assert_eq!(
            clause,
            "qtitle LIKE '%mental health%' OR qn_text LIKE '%mental health%'"
        );
    }

    #[test]
    fn test_where_clause_escapes_single_quotes() {
        let clause = where_clause("farmer's welfare", &["qtitle"]);
        assert_eq!(clause, "qtitle LIKE '%farmer''s welfare%'");
    }

    #[test]
    fn test_search_url_is_percent_encoded() {
        let url = search_url("mental health");
        assert!(url.starts_with(BASE_URL));
        // The raw clause must not survive unencoded.
        assert!(!url.contains("LIKE '%"));
        assert!(url.contains("whereclause="));
        assert!(url.contains("mental+health"));
    }

    #[test]
    fn test_row_without_body_text_is_filtered() {
        let mut row = row_json("");
        assert!(!has_body_text(&row));
        row.as_object_mut().unwrap().remove("qn_text");
        assert!(!has_body_text(&row));
        assert!(has_body_text(&row_json("Will the Minister state...")));
    }

    #[test]
    fn test_row_roundtrips_into_record() {
        let record = RsQuestion::from_value(row_json("Will the Minister state...")).unwrap();
        assert_eq!(
            record.subject(),
            "Shortage of psychiatrists in government hospitals"
        );
        assert_eq!(record.number().to_string(), "1272");
        assert_eq!(record.url(), "https://rsdoc.nic.in/docs/1272.pdf");
        assert_eq!(
            record.date().date(),
            NaiveDate::from_ymd_opt(2024, 2, 9).unwrap()
        );
    }

    #[test]
    fn test_row_without_files_fails_validation() {
        let mut row = row_json("body");
        row["files"] = serde_json::json!("");
        let err = RsQuestion::from_value(row).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::SchemaValidation { adapter: "rajyasabha", .. }
        ));
    }

    #[tokio::test]
    async fn test_scrape_merges_terms_into_flat_stream() {
        // No network in tests; exercise the merge shape with zero terms.
        let source = Rajyasabha::new(Transport::new(None).unwrap());
        let items: Vec<ScrapeResult> = source.scrape(Vec::new()).collect().await;
        assert!(items.is_empty());
    }
}
