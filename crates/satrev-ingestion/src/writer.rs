//! Re-serialization of selected records into a filtered BibTeX file.

use std::path::Path;

use satrev_common::{text::write_text, Result};
use tracing::info;

use crate::models::BibRecord;
use crate::note::NoteMeta;

/// Fields written back, in this order, when present.
pub const SERIALIZED_FIELDS: &[&str] = &[
    "author",
    "title",
    "journal",
    "booktitle",
    "year",
    "volume",
    "number",
    "pages",
    "doi",
    "url",
    "abstract",
    "keywords",
    "author_keywords",
    "affiliations",
    "address",
];

/// Default comment block at the top of a filtered file.
pub const DEFAULT_HEADER: &[&str] = &[
    "Filtered bibliography - scoping review",
    "Machine learning applied to traditional agricultural systems",
];

/// One labelled group of records with their scores.
#[derive(Debug, Clone)]
pub struct BibSection<'a> {
    pub heading: String,
    pub entries: Vec<(&'a BibRecord, f64)>,
}

/// One entry, note included, terminated by a blank line.
pub fn render_bibtex_entry(record: &BibRecord, note: &NoteMeta) -> String {
    let entry_type = if record.entry_type.is_empty() { "article" } else { record.entry_type.as_str() };
    let mut out = format!("@{}{{{},\n", entry_type, record.citation_key);
    for name in SERIALIZED_FIELDS {
        if let Some(value) = record.get(name).filter(|v| !v.is_empty()) {
            out.push_str(&format!("  {name} = {{{value}}},\n"));
        }
    }
    out.push_str(&format!("  note = {{{}}},\n", note.render()));
    out.push_str("}\n\n");
    out
}

/// Whole file: `%` header lines, then one banner per non-empty section.
pub fn render_filtered_bibtex(header: &[String], sections: &[BibSection<'_>]) -> String {
    let mut out = String::new();
    for line in header {
        out.push_str(&format!("% {line}\n"));
    }
    out.push('\n');

    for section in sections.iter().filter(|s| !s.entries.is_empty()) {
        out.push_str(&format!(
            "\n% ============= {} =============\n\n",
            section.heading.to_uppercase()
        ));
        for (record, score) in &section.entries {
            out.push_str(&render_bibtex_entry(record, &NoteMeta::new(&record.source, *score)));
        }
    }
    out
}

pub fn write_filtered_bibtex(path: &Path, header: &[String], sections: &[BibSection<'_>]) -> Result<()> {
    let entries: usize = sections.iter().map(|s| s.entries.len()).sum();
    write_text(path, &render_filtered_bibtex(header, sections))?;
    info!(path = %path.display(), entries, "Filtered bibliography written");
    Ok(())
}
