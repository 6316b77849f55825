//! Core data contracts shared by every source adapter.
//!
//! This module defines the pieces the rest of the pipeline is written
//! against:
//! - [`Question`]: the capability contract every concrete question type
//!   must satisfy
//! - [`QuestionNumber`]: the heterogeneous identifier used across portals
//!
//! The runner and the document fetcher only ever see `dyn Question`; the
//! concrete per-portal types live with their adapters under
//! `crate::scrapers`.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Contract satisfied by a question record from either house of Parliament.
///
/// A record is built by deserializing one row of a portal response and is
/// immutable afterwards; `date()` and `url()` are deterministic and free of
/// side effects once construction succeeded. Construction itself may fail
/// with a validation error when a required field is absent or malformed,
/// in which case the record is dropped from its page's yield.
pub trait Question: Send + Sync + fmt::Debug {
    /// The question's identifier as published by its portal.
    fn number(&self) -> &QuestionNumber;

    /// The question's title. Non-empty for a valid record.
    fn subject(&self) -> &str;

    /// The record's canonical date. Which date that is (tabling date vs.
    /// answer date) varies per portal; each adapter documents its choice.
    fn date(&self) -> NaiveDateTime;

    /// Absolute URL of the primary PDF. Never empty for a valid record.
    fn url(&self) -> &str;

    /// File extension parsed from the trailing path segment of [`url`],
    /// the substring after the final `.`. When the segment carries no dot
    /// the whole segment is returned.
    ///
    /// [`url`]: Question::url
    fn document_extension(&self) -> &str {
        let segment = self.url().rsplit('/').next().unwrap_or_default();
        match segment.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext,
            _ => segment,
        }
    }

    /// Short description used in logs and error messages.
    fn describe(&self) -> String {
        format!("{}) {}: {}", self.number(), self.subject(), self.url())
    }
}

/// Question identifier as it appears on the wire.
///
/// The portals do not agree on a numbering scheme. The Lok Sabha archive
/// publishes strings because some numbers carry letters or asterisk
/// markers, while the Rajya Sabha search returns JSON floats. Keeping the
/// variants explicit avoids silently coercing one portal's numbering into
/// another's.
///
/// # Display contract
///
/// - integers render plainly (`123`)
/// - floats with a zero fraction render as integers (`123.0` -> `123`)
/// - any other float renders with its fraction
/// - text renders verbatim (`"45A*"`)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum QuestionNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for QuestionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionNumber::Int(n) => write!(f, "{n}"),
            QuestionNumber::Float(x) if x.fract() == 0.0 => write!(f, "{}", *x as i64),
            QuestionNumber::Float(x) => write!(f, "{x}"),
            QuestionNumber::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Debug)]
    struct FakeQuestion {
        number: QuestionNumber,
        url: String,
    }

    impl Question for FakeQuestion {
        fn number(&self) -> &QuestionNumber {
            &self.number
        }

        fn subject(&self) -> &str {
            "Test subject"
        }

        fn date(&self) -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2025, 8, 6)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        }

        fn url(&self) -> &str {
            &self.url
        }
    }

    fn fake(url: &str) -> FakeQuestion {
        FakeQuestion {
            number: QuestionNumber::Int(42),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_document_extension_from_pdf_url() {
        let q = fake("https://example.gov/docs/annexure/123.pdf");
        assert_eq!(q.document_extension(), "pdf");
    }

    #[test]
    fn test_document_extension_uses_final_dot() {
        let q = fake("https://example.gov/docs/q.708.ls.docx");
        assert_eq!(q.document_extension(), "docx");
    }

    #[test]
    fn test_document_extension_without_dot_returns_segment() {
        let q = fake("https://example.gov/docs/rawfile");
        assert_eq!(q.document_extension(), "rawfile");
    }

    #[test]
    fn test_number_deserializes_from_int() {
        let n: QuestionNumber = serde_json::from_str("123").unwrap();
        assert_eq!(n, QuestionNumber::Int(123));
        assert_eq!(n.to_string(), "123");
    }

    #[test]
    fn test_number_deserializes_from_float() {
        let n: QuestionNumber = serde_json::from_str("1272.0").unwrap();
        assert_eq!(n, QuestionNumber::Float(1272.0));
        assert_eq!(n.to_string(), "1272");
    }

    #[test]
    fn test_number_deserializes_from_string() {
        let n: QuestionNumber = serde_json::from_str("\"45A*\"").unwrap();
        assert_eq!(n, QuestionNumber::Text("45A*".to_string()));
        assert_eq!(n.to_string(), "45A*");
    }

    #[test]
    fn test_number_float_with_fraction_keeps_fraction() {
        let n = QuestionNumber::Float(12.5);
        assert_eq!(n.to_string(), "12.5");
    }

    #[test]
    fn test_describe_mentions_number_and_url() {
        let q = fake("https://example.gov/docs/42.pdf");
        let desc = q.describe();
        assert!(desc.contains("42"));
        assert!(desc.contains("https://example.gov/docs/42.pdf"));
    }
}
