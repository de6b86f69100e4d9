//! satrev-ingestion: Bibliographic export ingestion.
//! - BibTeX-like record extraction (Scopus and Web of Science exports)
//! - Cross-source deduplication by normalized title, and merge
//! - Filtered bibliography serialization with the `note` score convention

pub mod bibtex;
pub mod dedup;
pub mod filtered;
pub mod models;
pub mod note;
pub mod writer;

pub use bibtex::{load_bibtex_file, parse_bibtex, parse_bibtex_with_stats, ParseStats};
pub use dedup::{merge, merge_sources, normalize_title, remove_duplicates, DuplicateMatch, MergeOutcome};
pub use filtered::{load_filtered_bibtex, parse_filtered_bibtex, FilteredEntry};
pub use models::{BibRecord, Corpus};
pub use note::NoteMeta;
pub use writer::{render_bibtex_entry, render_filtered_bibtex, write_filtered_bibtex, BibSection};
