//! BibTeX-like record extractor.
//!
//! Line-oriented scan: a line starting with `@` opens an entry
//! (`@type{key,`), every following line belongs to it until a line that is
//! exactly `}`. Field values are then pulled out of the entry block with one
//! brace-delimited pattern per recognized field name, tolerant of values
//! spanning several lines.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use satrev_common::text::collapse_whitespace;
use tracing::{debug, info, warn};

use crate::models::{unique_key, BibRecord, Corpus, RECOGNIZED_FIELDS};

/// Counters collected while scanning one export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseStats {
    /// Entries kept in the corpus (terminated or not).
    pub entries: usize,
    /// `@` lines without a parsable `type{key,` header.
    pub skipped_headers: usize,
    /// Entries never closed by a `}` line; kept with no fields.
    pub unterminated: usize,
    /// Entries from which no recognized field could be extracted.
    pub without_fields: usize,
    /// Citation keys seen more than once in the same file.
    pub repeated_keys: usize,
}

struct OpenEntry {
    record: BibRecord,
    lines: Vec<String>,
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^@(\w+)\{([^,]+),").unwrap())
}

fn field_regexes() -> &'static [(&'static str, Regex)] {
    static RES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    RES.get_or_init(|| {
        RECOGNIZED_FIELDS
            .iter()
            .map(|&name| {
                let pattern = format!(r"(?is)\b{}\s*=\s*\{{(.*?)\}}\s*(?:,|$)", regex::escape(name));
                (name, Regex::new(&pattern).unwrap())
            })
            .collect()
    })
}

/// Extract every recognized field from an entry block.
/// Values have their whitespace collapsed; empty values are dropped.
pub fn extract_fields(block: &str) -> Vec<(&'static str, String)> {
    field_regexes()
        .iter()
        .filter_map(|(name, re)| {
            let caps = re.captures(block)?;
            let value = collapse_whitespace(caps.get(1)?.as_str());
            (!value.is_empty()).then_some((*name, value))
        })
        .collect()
}

/// Parse the text of one export file into a corpus tagged with `source`.
pub fn parse_bibtex(text: &str, source: &str) -> Corpus {
    parse_bibtex_with_stats(text, source).0
}

/// Like [`parse_bibtex`], also returning scan counters.
pub fn parse_bibtex_with_stats(text: &str, source: &str) -> (Corpus, ParseStats) {
    let mut corpus = Corpus::new();
    let mut stats = ParseStats::default();
    let mut key_counts: HashMap<String, usize> = HashMap::new();
    let mut current: Option<OpenEntry> = None;

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with('@') {
            if let Some(open) = current.take() {
                debug!(key = %open.record.key, "Entry not terminated before next header");
                stats.unterminated += 1;
                stats.without_fields += 1;
                corpus.insert(open.record);
            }

            let Some(caps) = header_regex().captures(trimmed) else {
                debug!(line = %trimmed, "Skipping malformed entry header");
                stats.skipped_headers += 1;
                continue;
            };
            let entry_type = &caps[1];
            let citation_key = caps[2].trim();

            let seen = key_counts.entry(citation_key.to_string()).or_insert(0);
            *seen += 1;
            let mut record = BibRecord::new(citation_key, entry_type, source);
            if *seen > 1 {
                stats.repeated_keys += 1;
                record.key = unique_key(&format!("{citation_key}-{seen}"), source);
            }

            current = Some(OpenEntry { record, lines: Vec::new() });
            continue;
        }

        let Some(open) = current.as_mut() else {
            continue;
        };

        if trimmed == "}" {
            if let Some(open) = current.take() {
                let record = close_entry(open);
                if record.is_empty() {
                    stats.without_fields += 1;
                }
                corpus.insert(record);
            }
        } else {
            open.lines.push(line.to_string());
        }
    }

    if let Some(open) = current.take() {
        debug!(key = %open.record.key, "Entry not terminated at end of input");
        stats.unterminated += 1;
        stats.without_fields += 1;
        corpus.insert(open.record);
    }

    stats.entries = corpus.len();
    (corpus, stats)
}

fn close_entry(open: OpenEntry) -> BibRecord {
    let block = open.lines.join("\n");
    let mut record = open.record.with_raw_text(&block);
    for (name, value) in extract_fields(&block) {
        record.fields.insert(name.to_string(), value);
    }
    record
}

/// Load and parse one export file.
///
/// Never fails: a missing or unreadable file is logged and yields an empty
/// corpus, so a run over several optional sources keeps going. Invalid UTF-8
/// is decoded lossily.
pub fn load_bibtex_file(path: &Path, source: &str) -> Corpus {
    info!(source = %source, path = %path.display(), "Processing bibliographic export");

    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(source = %source, path = %path.display(), "Export file not found");
            return Corpus::new();
        }
        Err(e) => {
            warn!(source = %source, path = %path.display(), error = %e, "Failed to read export file");
            return Corpus::new();
        }
    };

    let text = String::from_utf8_lossy(&bytes);
    let (corpus, stats) = parse_bibtex_with_stats(&text, source);

    if stats.skipped_headers > 0 || stats.unterminated > 0 {
        warn!(
            source = %source,
            skipped_headers = stats.skipped_headers,
            unterminated = stats.unterminated,
            "Export contains malformed entries"
        );
    }
    info!(
        source = %source,
        records = stats.entries,
        without_fields = stats.without_fields,
        "References extracted"
    );
    corpus
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use satrev_test_utils::{scopus_sample, write_fixture, wos_sample, BibEntryBuilder};

    const SCOPUS_ENTRY: &str = "\
@ARTICLE{Silva2021,
  author = {Silva, A. and Souza, B.},
  title = {Mapping swidden
           agriculture with random forest},
  year = {2021},
  abstract = {We map   shifting cultivation
in the Amazon.},
  author_keywords = {swidden; random forest},
  affiliations = {Universidade Federal, Brazil},
  doi = {10.1000/xyz123},
  source = {Scopus}
}
";

    #[test]
    fn test_fields_collapsed_to_single_spaces() {
        let corpus = parse_bibtex(SCOPUS_ENTRY, "Scopus");
        assert_eq!(corpus.len(), 1);
        let r = corpus.get("Silva2021_Scopus").unwrap();
        assert_eq!(r.entry_type, "ARTICLE");
        assert_eq!(r.title(), "Mapping swidden agriculture with random forest");
        assert_eq!(r.abstract_text(), "We map shifting cultivation in the Amazon.");
        assert_eq!(r.year(), "2021");
        assert_eq!(r.field("author_keywords"), "swidden; random forest");
        assert_eq!(r.field("affiliations"), "Universidade Federal, Brazil");
        assert_eq!(r.field("doi"), "10.1000/xyz123");
        assert!(r.get("keywords").is_none());
    }

    #[test]
    fn test_raw_text_is_lowercased_block() {
        let corpus = parse_bibtex(SCOPUS_ENTRY, "Scopus");
        let r = corpus.get("Silva2021_Scopus").unwrap();
        assert!(r.raw_text.contains("mapping swidden"));
        assert!(r.raw_text.contains("source = {scopus}"));
        assert!(!r.raw_text.contains("@article"));
    }

    #[test]
    fn test_wos_schema_fields() {
        let text = "\
@article{ WOS:000123,
  title = {Local knowledge and crop models},
  keywords = {agrobiodiversity, modelling},
  address = {Kyoto Univ, Japan},
  journal = {Agric. Syst.},
  year = {2019},
}
";
        let corpus = parse_bibtex(text, "WoS");
        let r = corpus.get("WOS:000123_WoS").unwrap();
        assert_eq!(r.keywords(), "agrobiodiversity, modelling");
        assert_eq!(r.field("address"), "Kyoto Univ, Japan");
        assert_eq!(r.field("journal"), "Agric. Syst.");
        assert!(r.get("affiliations").is_none());
        assert!(r.get("author_keywords").is_none());
    }

    #[test]
    fn test_booktitle_does_not_satisfy_title() {
        let text = "\
@inproceedings{k1,
  booktitle = {Proc. of Something},
  title = {Real title},
}
";
        let corpus = parse_bibtex(text, "S");
        let r = corpus.get("k1_S").unwrap();
        assert_eq!(r.title(), "Real title");
        assert_eq!(r.field("booktitle"), "Proc. of Something");
    }

    #[test]
    fn test_author_keywords_does_not_satisfy_keywords() {
        let text = "@article{k1,\n  author_keywords = {a; b},\n  keywords = {c; d},\n}\n";
        let r = parse_bibtex(text, "S").into_records().remove(0);
        assert_eq!(r.field("keywords"), "c; d");
        assert_eq!(r.keywords(), "c; d");
        assert_eq!(r.field("author_keywords"), "a; b");
    }

    #[test]
    fn test_scopus_author_keywords_become_keyword_surface() {
        let text = BibEntryBuilder::article("Quispe2022")
            .title("Agrobiodiversity of Andean terraces")
            .field("author_keywords", "agrobiodiversity; andes")
            .field("affiliations", "UNSAAC, Cusco, Peru")
            .render();
        let r = parse_bibtex(&text, "Scopus").into_records().remove(0);
        assert!(r.get("keywords").is_none());
        assert_eq!(r.keywords(), "agrobiodiversity; andes");
    }

    #[test]
    fn test_empty_value_does_not_swallow_next_field() {
        let text = BibEntryBuilder::article("k").title("").year("2020").render();
        let r = parse_bibtex(&text, "S").into_records().remove(0);
        assert!(r.get("title").is_none());
        assert_eq!(r.year(), "2020");
    }

    #[test]
    fn test_sample_exports_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let scopus = load_bibtex_file(&write_fixture(dir.path(), "scopus.bib", &scopus_sample()), "Scopus");
        let wos = load_bibtex_file(&write_fixture(dir.path(), "wos.bib", &wos_sample()), "WoS");
        assert_eq!(scopus.len(), 4);
        assert_eq!(wos.len(), 2);
        assert_eq!(
            scopus.get("Silva2021_Scopus").unwrap().keywords(),
            "shifting cultivation; machine learning; land cover"
        );
        assert_eq!(wos.get("WOS:000222_WoS").unwrap().keywords(), "home gardens, biodiversity");
    }

    #[test]
    fn test_nested_braces_kept_in_value() {
        let text = "@article{k1,\n  title = {Using {GIS} in {Andean} terraces},\n  year = {2018},\n}\n";
        let r = parse_bibtex(text, "S").into_records().remove(0);
        assert_eq!(r.title(), "Using {GIS} in {Andean} terraces");
    }

    #[test]
    fn test_header_without_key_is_skipped() {
        let text = "@article{\n  title = {Orphan},\n}\n@article{ok,\n  title = {Kept},\n}\n";
        let (corpus, stats) = parse_bibtex_with_stats(text, "S");
        assert_eq!(corpus.len(), 1);
        assert_eq!(stats.skipped_headers, 1);
        assert_eq!(corpus.get("ok_S").unwrap().title(), "Kept");
    }

    #[test]
    fn test_unterminated_entry_retained_without_fields() {
        let text = "@article{a,\n  title = {Never closed},\n@article{b,\n  title = {Closed},\n}\n@misc{c,\n  title = {Eof},\n";
        let (corpus, stats) = parse_bibtex_with_stats(text, "S");
        assert_eq!(corpus.len(), 3);
        assert_eq!(stats.unterminated, 2);
        let a = corpus.get("a_S").unwrap();
        assert!(a.is_empty());
        assert_eq!(a.title(), "");
        assert_eq!(corpus.get("b_S").unwrap().title(), "Closed");
        let keys: Vec<&str> = corpus.keys().collect();
        assert_eq!(keys, vec!["a_S", "b_S", "c_S"]);
    }

    #[test]
    fn test_entry_with_no_fields_is_kept() {
        let text = "@article{empty,\n  foo = bar\n}\n";
        let (corpus, stats) = parse_bibtex_with_stats(text, "S");
        assert_eq!(corpus.len(), 1);
        assert_eq!(stats.without_fields, 1);
    }

    #[test]
    fn test_repeated_citation_key_in_one_file_keeps_both() {
        let text = "@article{dup,\n  title = {One},\n}\n@article{dup,\n  title = {Two},\n}\n";
        let (corpus, stats) = parse_bibtex_with_stats(text, "S");
        assert_eq!(corpus.len(), 2);
        assert_eq!(stats.repeated_keys, 1);
        assert_eq!(corpus.get("dup_S").unwrap().title(), "One");
        let second = corpus.get("dup-2_S").unwrap();
        assert_eq!(second.title(), "Two");
        assert_eq!(second.citation_key, "dup");
    }

    #[test]
    fn test_missing_file_yields_empty_corpus() {
        let corpus = load_bibtex_file(Path::new("/nonexistent/dir/export.bib"), "Scopus");
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.bib");
        let mut bytes = b"@article{k,\n  title = {Caf".to_vec();
        bytes.push(0xFF);
        bytes.extend_from_slice(b" systems},\n}\n");
        std::fs::write(&path, bytes).unwrap();
        let corpus = load_bibtex_file(&path, "S");
        assert_eq!(corpus.len(), 1);
        assert!(corpus.get("k_S").unwrap().title().ends_with("systems"));
    }
}
