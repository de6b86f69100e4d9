//! Classification of a whole corpus, bucketed by tier.

use std::collections::BTreeMap;

use satrev_ingestion::{BibSection, Corpus};
use tracing::info;

use crate::scorer::{Classifier, ScoredRecord, Tier};

#[derive(Debug, Clone, Default)]
pub struct ClassificationResults {
    buckets: BTreeMap<Tier, Vec<ScoredRecord>>,
}

impl ClassificationResults {
    /// Classify every record. Buckets other than Excluded are sorted by
    /// score descending; equal scores keep corpus order.
    pub fn from_corpus(corpus: &Corpus, classifier: &Classifier) -> Self {
        let mut buckets: BTreeMap<Tier, Vec<ScoredRecord>> =
            Tier::ALL.iter().map(|t| (*t, Vec::new())).collect();

        for record in corpus {
            let scored = classifier.classify(record);
            buckets.entry(scored.tier).or_default().push(scored);
        }

        for (tier, records) in buckets.iter_mut() {
            if *tier != Tier::Excluded {
                records.sort_by(|a, b| b.score.total_cmp(&a.score));
            }
        }

        let results = Self { buckets };
        info!(
            total = results.total(),
            relevant = results.relevant(),
            excellence = results.count(Tier::Excellence),
            high = results.count(Tier::High),
            adequate = results.count(Tier::Adequate),
            low = results.count(Tier::Low),
            excluded = results.count(Tier::Excluded),
            "Classification complete"
        );
        results
    }

    pub fn tier(&self, tier: Tier) -> &[ScoredRecord] {
        self.buckets.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, tier: Tier) -> usize {
        self.tier(tier).len()
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Excellence + High + Adequate.
    pub fn relevant(&self) -> usize {
        Tier::RELEVANT.iter().map(|t| self.count(*t)).sum()
    }

    /// Relevant records in tier order, best first within a tier.
    pub fn relevant_records(&self) -> impl Iterator<Item = &ScoredRecord> {
        Tier::RELEVANT.into_iter().flat_map(move |t| self.tier(t).iter())
    }

    /// Every classified record in tier order.
    pub fn all_records(&self) -> impl Iterator<Item = &ScoredRecord> {
        self.buckets.values().flat_map(|v| v.iter())
    }

    /// All classified records per source.
    pub fn sources(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        for scored in self.all_records() {
            *out.entry(scored.record.source.clone()).or_default() += 1;
        }
        out
    }

    /// Relevant records per source, broken down by tier.
    pub fn per_source(&self) -> BTreeMap<String, BTreeMap<Tier, usize>> {
        let mut out: BTreeMap<String, BTreeMap<Tier, usize>> = BTreeMap::new();
        for scored in self.relevant_records() {
            *out.entry(scored.record.source.clone())
                .or_default()
                .entry(scored.tier)
                .or_default() += 1;
        }
        out
    }

    /// Relevant records per publication year. Only years whose first four
    /// characters are digits are counted.
    pub fn year_histogram(&self) -> BTreeMap<i32, usize> {
        let mut out = BTreeMap::new();
        for scored in self.relevant_records() {
            let prefix: String = scored.record.year().chars().take(4).collect();
            if prefix.len() == 4 && prefix.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(year) = prefix.parse::<i32>() {
                    *out.entry(year).or_default() += 1;
                }
            }
        }
        out
    }

    /// Relevant tiers as filtered-bibliography sections.
    pub fn bib_sections(&self) -> Vec<BibSection<'_>> {
        Tier::RELEVANT
            .iter()
            .map(|t| BibSection {
                heading: t.as_str().to_string(),
                entries: self.tier(*t).iter().map(|s| (&s.record, s.score)).collect(),
            })
            .collect()
    }
}
