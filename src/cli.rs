//! Command-line interface definitions for the archiver.
//!
//! This module defines the CLI arguments and options using the `clap`
//! crate. Secrets and folder ids can be provided via environment
//! variables instead of flags.

use clap::{Parser, ValueEnum};

/// Command-line arguments for the archiver.
///
/// # Examples
///
/// ```sh
/// # Archive last week's questions matching two terms
/// parliament_archive -t "mental health" -t suicide --parent-folder <folder-id>
///
/// # Only the Rajya Sabha portal, wider window
/// parliament_archive -t suicide --source rajyasabha --threshold-days 30
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search term to match against question text (repeatable)
    #[arg(short = 't', long = "term", required = true)]
    pub terms: Vec<String>,

    /// How many days back a question's date may lie to be archived
    #[arg(long, default_value_t = 7)]
    pub threshold_days: i64,

    /// Drive folder id the dated run folder is created under
    #[arg(long, env = "ARCHIVE_PARENT_FOLDER")]
    pub parent_folder: String,

    /// OAuth bearer token for the Drive API
    #[arg(long, env = "DRIVE_ACCESS_TOKEN", hide_env_values = true)]
    pub drive_token: String,

    /// Portal to scrape (repeatable; defaults to all portals)
    #[arg(long = "source", value_enum)]
    pub sources: Vec<SourceKind>,

    /// Maximum number of uploads in flight at once
    #[arg(long, default_value_t = 8)]
    pub upload_concurrency: usize,
}

/// Portals the archiver knows how to scrape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    Loksabha,
    Rajyasabha,
}

impl Cli {
    /// Selected portals, deduplicated, defaulting to all of them.
    pub fn selected_sources(&self) -> Vec<SourceKind> {
        if self.sources.is_empty() {
            return vec![SourceKind::Loksabha, SourceKind::Rajyasabha];
        }
        let mut selected = Vec::new();
        for kind in &self.sources {
            if !selected.contains(kind) {
                selected.push(*kind);
            }
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_cli_parsing() {
        let cli = parse(&[
            "parliament_archive",
            "--term",
            "mental health",
            "--term",
            "suicide",
            "--parent-folder",
            "folder-123",
            "--drive-token",
            "token",
        ]);

        assert_eq!(cli.terms, vec!["mental health", "suicide"]);
        assert_eq!(cli.threshold_days, 7);
        assert_eq!(cli.parent_folder, "folder-123");
        assert_eq!(cli.upload_concurrency, 8);
    }

    #[test]
    fn test_sources_default_to_all() {
        let cli = parse(&[
            "parliament_archive",
            "-t",
            "suicide",
            "--parent-folder",
            "f",
            "--drive-token",
            "x",
        ]);
        assert_eq!(
            cli.selected_sources(),
            vec![SourceKind::Loksabha, SourceKind::Rajyasabha]
        );
    }

    #[test]
    fn test_sources_are_deduplicated() {
        let cli = parse(&[
            "parliament_archive",
            "-t",
            "suicide",
            "--parent-folder",
            "f",
            "--drive-token",
            "x",
            "--source",
            "rajyasabha",
            "--source",
            "rajyasabha",
        ]);
        assert_eq!(cli.selected_sources(), vec![SourceKind::Rajyasabha]);
    }
}
