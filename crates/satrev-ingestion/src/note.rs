//! Provenance and score embedded in the `note` field of filtered entries.
//!
//! Written as `Source: Scopus, Score: 12.0`. Older files use `Fonte:` in
//! place of `Source:`; both are read.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteMeta {
    pub source: Option<String>,
    pub score: Option<f64>,
}

fn score_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Score:\s*([\d.]+)").unwrap())
}

fn source_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:Source|Fonte):\s*([^,]+)").unwrap())
}

impl NoteMeta {
    pub fn new(source: &str, score: f64) -> Self {
        Self {
            source: Some(source.to_string()),
            score: Some(score),
        }
    }

    /// Parse a note value. Missing or malformed parts come back as `None`.
    pub fn parse(note: &str) -> Self {
        let score = score_regex()
            .captures(note)
            .and_then(|c| c[1].parse::<f64>().ok())
            .filter(|s| s.is_finite());
        let source = source_regex()
            .captures(note)
            .map(|c| c[1].trim().to_string())
            .filter(|s| !s.is_empty());
        Self { source, score }
    }

    /// `Source: X, Score: N.N`; score with one decimal.
    pub fn render(&self) -> String {
        format!(
            "Source: {}, Score: {:.1}",
            self.source.as_deref().unwrap_or(""),
            self.score.unwrap_or(0.0)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(NoteMeta::new("Scopus", 12.0).render(), "Source: Scopus, Score: 12.0");
        assert_eq!(NoteMeta::new("WoS", 7.26).render(), "Source: WoS, Score: 7.3");
    }

    #[test]
    fn test_parse_both_conventions() {
        let en = NoteMeta::parse("Source: Scopus, Score: 13.5");
        assert_eq!(en.source.as_deref(), Some("Scopus"));
        assert_eq!(en.score, Some(13.5));

        let pt = NoteMeta::parse("Fonte: WoS, Score: 6.0");
        assert_eq!(pt.source.as_deref(), Some("WoS"));
        assert_eq!(pt.score, Some(6.0));
    }

    #[test]
    fn test_parse_free_text_note() {
        let meta = NoteMeta::parse("Cited by 12");
        assert_eq!(meta, NoteMeta::default());
    }

    #[test]
    fn test_parse_malformed_score() {
        let meta = NoteMeta::parse("Source: Scopus, Score: 1.2.3");
        assert_eq!(meta.score, None);
        assert_eq!(meta.source.as_deref(), Some("Scopus"));
    }
}
