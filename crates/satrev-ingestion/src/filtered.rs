//! Reading back a filtered bibliography written by [`crate::writer`].

use std::path::Path;

use tracing::info;

use crate::bibtex::{load_bibtex_file, parse_bibtex};
use crate::models::BibRecord;
use crate::note::NoteMeta;

pub const UNKNOWN_SOURCE: &str = "Unknown";

/// A re-parsed record with the score and source recovered from its note.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredEntry {
    pub record: BibRecord,
    pub score: f64,
    pub source: String,
}

impl FilteredEntry {
    pub fn from_record(record: BibRecord) -> Self {
        let meta = NoteMeta::parse(record.field("note"));
        Self {
            score: meta.score.unwrap_or(0.0),
            source: meta.source.unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            record,
        }
    }

    /// First 19xx/20xx year in the `year` field.
    pub fn year(&self) -> Option<i32> {
        satrev_common::text::first_year(self.record.year())
    }
}

/// Entries of a rendered filtered bibliography, in text order.
pub fn parse_filtered_bibtex(text: &str) -> Vec<FilteredEntry> {
    parse_bibtex(text, "filtered")
        .into_iter()
        .map(FilteredEntry::from_record)
        .collect()
}

/// Load every entry of a filtered file, in file order.
/// A missing file yields an empty list.
pub fn load_filtered_bibtex(path: &Path) -> Vec<FilteredEntry> {
    let entries: Vec<FilteredEntry> = load_bibtex_file(path, "filtered")
        .into_iter()
        .map(FilteredEntry::from_record)
        .collect();
    info!(path = %path.display(), entries = entries.len(), "Filtered bibliography loaded");
    entries
}
