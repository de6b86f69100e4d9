//! Heuristic relevance scoring of bibliographic records.
//!
//! Exclusion is checked first and is terminal. Otherwise every configured
//! term is searched (case-insensitive substring) in the record's title,
//! keywords, abstract and raw entry text, and the weighted hits are summed.

use satrev_ingestion::BibRecord;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::terms::ClassifierConfig;
use crate::weights::TierThresholds;

// ── Tiers ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Excellence,
    High,
    Adequate,
    Low,
    Excluded,
}

impl Tier {
    pub const ALL: [Tier; 5] = [Tier::Excellence, Tier::High, Tier::Adequate, Tier::Low, Tier::Excluded];

    /// Tiers that make it into the filtered bibliography.
    pub const RELEVANT: [Tier; 3] = [Tier::Excellence, Tier::High, Tier::Adequate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Excellence => "excellence",
            Tier::High       => "high",
            Tier::Adequate   => "adequate",
            Tier::Low        => "low",
            Tier::Excluded   => "excluded",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Excellence => "Excellence",
            Tier::High       => "High relevance",
            Tier::Adequate   => "Adequate",
            Tier::Low        => "Low",
            Tier::Excluded   => "Excluded",
        }
    }

    pub fn is_relevant(&self) -> bool {
        matches!(self, Tier::Excellence | Tier::High | Tier::Adequate)
    }

    /// Tier of a non-excluded score. First threshold reached wins.
    pub fn from_score(score: f64, thresholds: &TierThresholds) -> Tier {
        if score >= thresholds.excellence {
            Tier::Excellence
        } else if score >= thresholds.high {
            Tier::High
        } else if score >= thresholds.adequate {
            Tier::Adequate
        } else {
            Tier::Low
        }
    }

    /// Lower bound of the tier, when it has one.
    pub fn threshold(&self, thresholds: &TierThresholds) -> Option<f64> {
        match self {
            Tier::Excellence => Some(thresholds.excellence),
            Tier::High       => Some(thresholds.high),
            Tier::Adequate   => Some(thresholds.adequate),
            Tier::Low        => Some(thresholds.low),
            Tier::Excluded   => None,
        }
    }
}

// ── Matches ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermCategory {
    Priority,
    High,
    Adequate,
}

impl TermCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermCategory::Priority => "PRIORITY",
            TermCategory::High     => "HIGH",
            TermCategory::Adequate => "ADEQUATE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLocation {
    Title,
    Keywords,
    Abstract,
    RawText,
}

impl MatchLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchLocation::Title    => "title",
            MatchLocation::Keywords => "keywords",
            MatchLocation::Abstract => "abstract",
            MatchLocation::RawText  => "raw text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedTerm {
    pub category: TermCategory,
    pub term: String,
    pub points: f64,
    pub locations: Vec<MatchLocation>,
}

impl MatchedTerm {
    /// One-line description used in reports, e.g.
    /// `PRIORITY (title, abstract): agrobiodiversity`.
    pub fn describe(&self) -> String {
        match self.category {
            TermCategory::Priority => {
                let places: Vec<&str> = self.locations.iter().map(MatchLocation::as_str).collect();
                format!("{} ({}): {}", self.category.as_str(), places.join(", "), self.term)
            }
            _ => format!("{}: {}", self.category.as_str(), self.term),
        }
    }
}

/// A record annotated with its classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    pub record: BibRecord,
    pub score: f64,
    pub matched_terms: Vec<MatchedTerm>,
    pub tier: Tier,
    /// Exclusion term that fired, if any.
    pub exclusion: Option<String>,
}

// ── Classifier ────────────────────────────────────────────────────────────────

/// Lower-cased search surfaces of one record.
struct Surfaces {
    title: String,
    keywords: String,
    abstract_text: String,
    raw: String,
}

impl Surfaces {
    fn of(record: &BibRecord) -> Self {
        Self {
            title: record.title().to_lowercase(),
            keywords: record.keywords().to_lowercase(),
            abstract_text: record.abstract_text().to_lowercase(),
            raw: record.raw_text.to_lowercase(),
        }
    }

    /// Distinct locations of a priority term. Raw text only counts when the
    /// abstract lacks the term.
    fn priority_locations(&self, term: &str) -> Vec<MatchLocation> {
        let mut found = Vec::new();
        if self.title.contains(term) {
            found.push(MatchLocation::Title);
        }
        if self.keywords.contains(term) {
            found.push(MatchLocation::Keywords);
        }
        if self.abstract_text.contains(term) {
            found.push(MatchLocation::Abstract);
        } else if self.raw.contains(term) {
            found.push(MatchLocation::RawText);
        }
        found
    }

    /// First location of a presence-only term.
    fn first_location(&self, term: &str) -> Option<MatchLocation> {
        [
            (&self.title, MatchLocation::Title),
            (&self.keywords, MatchLocation::Keywords),
            (&self.abstract_text, MatchLocation::Abstract),
            (&self.raw, MatchLocation::RawText),
        ]
        .into_iter()
        .find(|(text, _)| text.contains(term))
        .map(|(_, loc)| loc)
    }
}

pub struct Classifier {
    config: ClassifierConfig,
    priority: Vec<String>,
    high: Vec<String>,
    adequate: Vec<String>,
    exclusion: Vec<String>,
}

fn lowered(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            priority: lowered(&config.priority_terms),
            high: lowered(&config.high_terms),
            adequate: lowered(&config.adequate_terms),
            exclusion: lowered(&config.exclusion_terms),
            config,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// First exclusion term found in the title, entry type or raw text.
    pub fn check_exclusion(&self, record: &BibRecord) -> Option<String> {
        let title = record.title().to_lowercase();
        let entry_type = record.entry_type.to_lowercase();
        let raw = record.raw_text.to_lowercase();
        self.exclusion
            .iter()
            .find(|t| title.contains(t.as_str()) || entry_type.contains(t.as_str()) || raw.contains(t.as_str()))
            .cloned()
    }

    /// Score and matched terms of a record, ignoring exclusion.
    pub fn score(&self, record: &BibRecord) -> (f64, Vec<MatchedTerm>) {
        let surfaces = Surfaces::of(record);
        let weights = &self.config.weights;
        let mut score = 0.0;
        let mut matched = Vec::new();

        for term in &self.priority {
            let locations = surfaces.priority_locations(term);
            if locations.is_empty() {
                continue;
            }
            let points = weights.priority * locations.len() as f64;
            score += points;
            matched.push(MatchedTerm { category: TermCategory::Priority, term: term.clone(), points, locations });
        }

        for (category, terms, weight) in [
            (TermCategory::High, &self.high, weights.high),
            (TermCategory::Adequate, &self.adequate, weights.adequate),
        ] {
            for term in terms {
                if let Some(loc) = surfaces.first_location(term) {
                    score += weight;
                    matched.push(MatchedTerm { category, term: term.clone(), points: weight, locations: vec![loc] });
                }
            }
        }

        (score, matched)
    }

    pub fn classify(&self, record: &BibRecord) -> ScoredRecord {
        if let Some(term) = self.check_exclusion(record) {
            trace!(key = %record.key, term = %term, "Record excluded");
            return ScoredRecord {
                record: record.clone(),
                score: 0.0,
                matched_terms: Vec::new(),
                tier: Tier::Excluded,
                exclusion: Some(term),
            };
        }

        let (score, matched_terms) = self.score(record);
        let tier = Tier::from_score(score, &self.config.thresholds);
        trace!(key = %record.key, score, tier = tier.as_str(), "Record classified");
        ScoredRecord { record: record.clone(), score, matched_terms, tier, exclusion: None }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}
