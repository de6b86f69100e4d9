//! Data models for the ingestion pipeline.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Field names the extractor looks for in every entry block.
///
/// Scopus exports use `affiliations`/`author_keywords`, Web of Science uses
/// `address`/`keywords`; both sets are recognized independently.
pub const RECOGNIZED_FIELDS: &[&str] = &[
    "title",
    "author",
    "year",
    "abstract",
    "keywords",
    "affiliations",
    "address",
    "author_keywords",
    "journal",
    "booktitle",
    "volume",
    "number",
    "pages",
    "doi",
    "url",
    "publisher",
    "issn",
    "note",
];

/// One bibliographic entry as extracted from an export file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BibRecord {
    /// Unique key within the merged corpus: `{citation_key}_{source}`.
    pub key: String,
    /// Key as written in the export file.
    pub citation_key: String,
    /// Declared entry type, e.g. "article".
    pub entry_type: String,
    /// Corpus label, e.g. "Scopus".
    pub source: String,
    /// Recognized field values, lower-case names. Absent fields are missing.
    pub fields: BTreeMap<String, String>,
    /// Lower-cased entry block, the fallback search surface.
    pub raw_text: String,
}

impl BibRecord {
    pub fn new(citation_key: &str, entry_type: &str, source: &str) -> Self {
        Self {
            key: unique_key(citation_key, source),
            citation_key: citation_key.to_string(),
            entry_type: entry_type.to_string(),
            source: source.to_string(),
            fields: BTreeMap::new(),
            raw_text: String::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_lowercase(), value.to_string());
        self
    }

    /// Builder-style raw text setter. Stored lower-cased.
    pub fn with_raw_text(mut self, raw: &str) -> Self {
        self.raw_text = raw.to_lowercase();
        self
    }

    /// Field value, if present. Names are case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(v) => Some(v.as_str()),
            None => self.fields.get(&name.to_lowercase()).map(String::as_str),
        }
    }

    /// Field value, or `""` when absent.
    pub fn field(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn title(&self) -> &str    { self.field("title") }
    pub fn author(&self) -> &str   { self.field("author") }
    pub fn year(&self) -> &str     { self.field("year") }
    pub fn abstract_text(&self) -> &str { self.field("abstract") }

    /// Keyword surface: `keywords`, or Scopus `author_keywords` when the
    /// record has no `keywords` value.
    pub fn keywords(&self) -> &str {
        self.get("keywords")
            .or_else(|| self.get("author_keywords"))
            .unwrap_or("")
    }

    /// True when no recognized field could be extracted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Disambiguated record key.
pub fn unique_key(citation_key: &str, source: &str) -> String {
    format!("{citation_key}_{source}")
}

/// Insertion-ordered collection of records keyed by [`BibRecord::key`].
///
/// Iteration follows insertion order, never hash order, so every output
/// derived from a corpus is reproducible.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<BibRecord>,
    index: HashMap<String, usize>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. On key collision the old record is replaced in
    /// place (keeping its position) and returned.
    pub fn insert(&mut self, record: BibRecord) -> Option<BibRecord> {
        match self.index.get(&record.key) {
            Some(&pos) => Some(std::mem::replace(&mut self.records[pos], record)),
            None => {
                self.index.insert(record.key.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&BibRecord> {
        self.index.get(key).map(|&pos| &self.records[pos])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BibRecord> {
        self.records.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.key.as_str())
    }

    pub fn into_records(self) -> Vec<BibRecord> {
        self.records
    }
}

impl FromIterator<BibRecord> for Corpus {
    fn from_iter<I: IntoIterator<Item = BibRecord>>(iter: I) -> Self {
        let mut corpus = Corpus::new();
        for record in iter {
            corpus.insert(record);
        }
        corpus
    }
}

impl IntoIterator for Corpus {
    type Item = BibRecord;
    type IntoIter = std::vec::IntoIter<BibRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a BibRecord;
    type IntoIter = std::slice::Iter<'a, BibRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
