//! Error taxonomy for the archival pipeline.
//!
//! Errors are scoped deliberately: a [`SchemaValidation`] failure belongs to
//! one record, a [`Transport`] failure to one network operation, and only
//! [`FolderCreation`] is fatal to a whole run, since nothing can be archived
//! without a destination folder. The runner contains record- and
//! operation-scoped errors instead of letting them abort sibling work.
//!
//! [`SchemaValidation`]: ArchiveError::SchemaValidation
//! [`Transport`]: ArchiveError::Transport
//! [`FolderCreation`]: ArchiveError::FolderCreation

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Everything that can go wrong between a portal response and a stored PDF.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// A source record or response envelope failed to deserialize into the
    /// question contract. Scoped to that record, never fatal to the run.
    #[error("{adapter} record failed validation: {detail}")]
    SchemaValidation {
        /// Tag of the adapter that produced the payload.
        adapter: &'static str,
        /// What was missing or malformed.
        detail: String,
    },

    /// A network call failed or returned a non-success status.
    #[error("{context}: {source}")]
    Transport {
        /// The operation that issued the call, e.g. `GET <url>`.
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// A document download succeeded at the transport level but returned
    /// zero bytes. Carries the originating record's descriptor so callers
    /// can report link-rot.
    #[error("empty document body for {record}")]
    EmptyDocument { record: String },

    /// The one-shot run folder creation failed. No uploads can proceed,
    /// so this aborts every adapter depending on the folder.
    #[error("failed to create run folder: {0}")]
    FolderCreation(#[source] Box<ArchiveError>),
}

impl ArchiveError {
    /// Convenience constructor for transport failures.
    pub(crate) fn transport(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_validation_display_names_adapter() {
        let err = ArchiveError::SchemaValidation {
            adapter: "loksabha",
            detail: "missing field `files`".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("loksabha"));
        assert!(msg.contains("missing field `files`"));
    }

    #[test]
    fn test_empty_document_carries_record() {
        let err = ArchiveError::EmptyDocument {
            record: "rajyasabha-1272.pdf".to_string(),
        };
        assert_eq!(err.to_string(), "empty document body for rajyasabha-1272.pdf");
    }
}
