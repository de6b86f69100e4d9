//! Cross-source deduplication by normalized title, and corpus merge.
//!
//! The first corpus is the primary one: its records are never dropped.
//! Records of later corpora whose normalized title equals a title already
//! merged are reported as duplicates and left out.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::models::Corpus;

/// A secondary record dropped because its title matched a primary record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateMatch {
    pub secondary_key: String,
    pub primary_key: String,
    pub title: String,
}

#[derive(Debug, Default)]
pub struct DedupOutcome {
    /// Secondary corpus minus duplicates, order preserved.
    pub secondary: Corpus,
    pub duplicates: Vec<DuplicateMatch>,
}

#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub corpus: Corpus,
    /// Records kept per source label, in input order.
    pub kept_per_source: Vec<(String, usize)>,
    pub duplicates: Vec<DuplicateMatch>,
}

fn non_word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").unwrap())
}

/// Lower-case, strip punctuation, collapse whitespace.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = non_word_regex().replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn title_index(corpus: &Corpus) -> HashMap<String, String> {
    let mut index = HashMap::new();
    for record in corpus {
        let norm = normalize_title(record.title());
        if norm.is_empty() {
            continue;
        }
        // First record with a given title stays the reference.
        index.entry(norm).or_insert_with(|| record.key.clone());
    }
    index
}

/// Drop from `secondary` every record whose normalized title already
/// appears in `primary`.
pub fn remove_duplicates(primary: &Corpus, secondary: Corpus) -> DedupOutcome {
    let index = title_index(primary);
    let mut outcome = DedupOutcome::default();

    for record in secondary {
        let norm = normalize_title(record.title());
        match index.get(&norm).filter(|_| !norm.is_empty()) {
            Some(primary_key) => {
                debug!(secondary = %record.key, primary = %primary_key, "Duplicate title");
                outcome.duplicates.push(DuplicateMatch {
                    secondary_key: record.key.clone(),
                    primary_key: primary_key.clone(),
                    title: record.title().to_string(),
                });
            }
            None => {
                outcome.secondary.insert(record);
            }
        }
    }

    outcome
}

/// Union of two corpora keyed by record key. The primary entry wins on
/// collision; primary records come first.
pub fn merge(primary: Corpus, secondary: Corpus) -> Corpus {
    let mut merged = primary;
    for record in secondary {
        if !merged.contains_key(&record.key) {
            merged.insert(record);
        }
    }
    merged
}

/// Fold labelled corpora in priority order: each is deduplicated against
/// everything merged so far, then merged in.
pub fn merge_sources(corpora: Vec<(String, Corpus)>) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for (position, (label, corpus)) in corpora.into_iter().enumerate() {
        let before = corpus.len();

        let incoming = if position == 0 {
            corpus
        } else {
            let dedup = remove_duplicates(&outcome.corpus, corpus);
            outcome.duplicates.extend(dedup.duplicates);
            dedup.secondary
        };

        info!(
            source = %label,
            records = before,
            kept = incoming.len(),
            "Merged source corpus"
        );
        outcome.kept_per_source.push((label, incoming.len()));
        outcome.corpus = merge(std::mem::take(&mut outcome.corpus), incoming);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BibRecord;
    use pretty_assertions::assert_eq;

    fn rec(key: &str, source: &str, title: &str) -> BibRecord {
        let r = BibRecord::new(key, "article", source);
        if title.is_empty() { r } else { r.with_field("title", title) }
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Mapping   Swidden: A Case-Study! "), "mapping swidden a casestudy");
        assert_eq!(normalize_title("Sistemas Agrícolas\nTradicionais"), "sistemas agrícolas tradicionais");
        assert_eq!(normalize_title("?!"), "");
    }

    #[test]
    fn test_remove_duplicates_by_normalized_title() {
        let primary: Corpus = vec![rec("p1", "Scopus", "Random Forest for Swidden Mapping")].into_iter().collect();
        let secondary: Corpus = vec![
            rec("w1", "WoS", "random forest for swidden mapping."),
            rec("w2", "WoS", "Something else"),
        ]
        .into_iter()
        .collect();

        let outcome = remove_duplicates(&primary, secondary);
        assert_eq!(outcome.secondary.len(), 1);
        assert!(outcome.secondary.contains_key("w2_WoS"));
        assert_eq!(
            outcome.duplicates,
            vec![DuplicateMatch {
                secondary_key: "w1_WoS".into(),
                primary_key: "p1_Scopus".into(),
                title: "random forest for swidden mapping.".into(),
            }]
        );
    }

    #[test]
    fn test_empty_titles_never_match() {
        let primary: Corpus = vec![rec("p1", "Scopus", "")].into_iter().collect();
        let secondary: Corpus = vec![rec("w1", "WoS", ""), rec("w2", "WoS", "!!")].into_iter().collect();
        let outcome = remove_duplicates(&primary, secondary);
        assert_eq!(outcome.secondary.len(), 2);
        assert!(outcome.duplicates.is_empty());
    }

    #[test]
    fn test_merge_primary_wins() {
        let primary: Corpus = vec![rec("k", "S", "Primary")].into_iter().collect();
        let mut clash = rec("other", "S", "Secondary");
        clash.key = "k_S".into();
        let secondary: Corpus = vec![clash, rec("z", "S", "Z")].into_iter().collect();
        let merged = merge(primary, secondary);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("k_S").unwrap().title(), "Primary");
        let keys: Vec<&str> = merged.keys().collect();
        assert_eq!(keys, vec!["k_S", "z_S"]);
    }

    #[test]
    fn test_merge_sources_three_way() {
        let scopus: Corpus = vec![rec("a", "Scopus", "Alpha"), rec("b", "Scopus", "Beta")].into_iter().collect();
        let wos: Corpus = vec![rec("a", "WoS", "ALPHA"), rec("c", "WoS", "Gamma")].into_iter().collect();
        let other: Corpus = vec![rec("x", "Lens", "gamma"), rec("y", "Lens", "Delta")].into_iter().collect();

        let outcome = merge_sources(vec![
            ("Scopus".to_string(), scopus),
            ("WoS".to_string(), wos),
            ("Lens".to_string(), other),
        ]);
        let keys: Vec<&str> = outcome.corpus.keys().collect();
        assert_eq!(keys, vec!["a_Scopus", "b_Scopus", "c_WoS", "y_Lens"]);
        assert_eq!(
            outcome.kept_per_source,
            vec![("Scopus".to_string(), 2), ("WoS".to_string(), 1), ("Lens".to_string(), 1)]
        );
        assert_eq!(outcome.duplicates.len(), 2);
        assert_eq!(outcome.duplicates[1].primary_key, "c_WoS");
    }

    #[test]
    fn test_merge_sources_handles_empty_corpus() {
        let wos: Corpus = vec![rec("a", "WoS", "A")].into_iter().collect();
        let outcome = merge_sources(vec![("Scopus".to_string(), Corpus::new()), ("WoS".to_string(), wos)]);
        assert_eq!(outcome.corpus.len(), 1);
        assert_eq!(outcome.kept_per_source[0], ("Scopus".to_string(), 0));
    }
}
