//! Human-readable and structured outputs of a classification run.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use satrev_common::{text::{create_parent_dirs, truncate_chars}, Result};
use satrev_ingestion::FilteredEntry;
use serde::Serialize;
use tracing::info;

use crate::results::ClassificationResults;
use crate::scorer::Tier;
use crate::terms::ClassifierConfig;
use crate::weights::TierThresholds;

const RULE_WIDTH: usize = 90;
const MAX_AUTHOR_CHARS: usize = 100;
const MAX_TERMS_SHOWN: usize = 15;
const HIGH_ABSTRACT_CHARS: usize = 300;

fn pct(part: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { part as f64 / total as f64 * 100.0 }
}

// ── Text report ───────────────────────────────────────────────────────────────

pub fn render_text_report(results: &ClassificationResults, config: &ClassifierConfig) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let t = &config.thresholds;
    let total = results.total();
    let relevant = results.relevant();
    let mut out = String::new();

    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "CONSOLIDATED REPORT - RELEVANT ARTICLES");
    let _ = writeln!(out, "Topic: Machine learning applied to traditional agricultural systems");
    let sources: Vec<String> = results.sources().into_keys().collect();
    let _ = writeln!(out, "Sources: {}", sources.join(" + "));
    let _ = writeln!(out, "{heavy}\n");

    let _ = writeln!(out, "EXECUTIVE SUMMARY");
    let _ = writeln!(out, "{light}");
    let _ = writeln!(out, "Total analysed: {total}");
    let _ = writeln!(out, "Relevant selected: {relevant} ({:.1}%)", pct(relevant, total));
    let _ = writeln!(
        out,
        "Not selected (low relevance + excluded): {} ({:.1}%)\n",
        total - relevant,
        pct(total - relevant, total)
    );
    for tier in Tier::RELEVANT {
        let threshold = tier.threshold(t).unwrap_or(0.0);
        let _ = writeln!(out, "{} (>= {} pts): {}", tier.label(), threshold, results.count(tier));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "DISTRIBUTION BY SOURCE (relevant articles)");
    let _ = writeln!(out, "{light}");
    for (source, tiers) in results.per_source() {
        let n: usize = tiers.values().sum();
        let _ = writeln!(out, "  * {source}: {n} articles");
        let detail: Vec<String> = Tier::RELEVANT
            .iter()
            .filter_map(|tier| tiers.get(tier).map(|c| format!("{c} {}", tier.as_str())))
            .collect();
        let _ = writeln!(out, "    ({})", detail.join(", "));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "TEMPORAL DISTRIBUTION (relevant articles)");
    let _ = writeln!(out, "{light}");
    for (year, n) in results.year_histogram() {
        let _ = writeln!(out, "  {year}: {} ({n})", "█".repeat(n));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "\n{heavy}");
    let _ = writeln!(out, "FULL LIST OF THE {relevant} RELEVANT ARTICLES");
    let _ = writeln!(out, "{heavy}\n");

    let mut counter = 1;
    for tier in Tier::RELEVANT {
        let records = results.tier(tier);
        if records.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{light}");
        let _ = writeln!(out, "{} ({} articles)", tier.label().to_uppercase(), records.len());
        let _ = writeln!(out, "{light}\n");

        for scored in records {
            let r = &scored.record;
            let year: String = r.get("year").unwrap_or("N/A").chars().take(4).collect();
            let author = r.get("author").unwrap_or("N/A");
            let ellipsis = if author.chars().count() > MAX_AUTHOR_CHARS { "..." } else { "" };

            let _ = writeln!(out, "{counter}. [{}] {}", r.source, r.citation_key);
            let _ = writeln!(out, "   Score: {:.1} points", scored.score);
            let _ = writeln!(out, "   Year: {year}");
            let _ = writeln!(out, "   Author(s): {}{ellipsis}", truncate_chars(author, MAX_AUTHOR_CHARS));
            let _ = writeln!(out, "   Title: {}", r.get("title").unwrap_or("Untitled"));

            if !scored.matched_terms.is_empty() {
                let _ = writeln!(out, "   Matched terms ({}):", scored.matched_terms.len());
                for term in scored.matched_terms.iter().take(MAX_TERMS_SHOWN) {
                    let _ = writeln!(out, "      * {}", term.describe());
                }
                if scored.matched_terms.len() > MAX_TERMS_SHOWN {
                    let _ = writeln!(
                        out,
                        "      ... and {} more terms",
                        scored.matched_terms.len() - MAX_TERMS_SHOWN
                    );
                }
            }
            let _ = writeln!(out);
            counter += 1;
        }
    }

    out
}

// ── JSON summary ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationSummary {
    pub total: usize,
    pub relevant: usize,
    pub not_selected: usize,
    pub tiers: BTreeMap<String, usize>,
    /// Relevant records per source and tier.
    pub per_source: BTreeMap<String, BTreeMap<String, usize>>,
    pub thresholds: TierThresholds,
}

pub fn render_summary(results: &ClassificationResults, config: &ClassifierConfig) -> ClassificationSummary {
    let tiers = Tier::ALL
        .iter()
        .map(|t| (t.as_str().to_string(), results.count(*t)))
        .collect();
    let per_source = results
        .per_source()
        .into_iter()
        .map(|(source, counts)| {
            let counts = counts.into_iter().map(|(t, n)| (t.as_str().to_string(), n)).collect();
            (source, counts)
        })
        .collect();

    ClassificationSummary {
        total: results.total(),
        relevant: results.relevant(),
        not_selected: results.total() - results.relevant(),
        tiers,
        per_source,
        thresholds: config.thresholds,
    }
}

// ── Classified CSV ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ClassifiedRow<'a> {
    key: &'a str,
    citation_key: &'a str,
    source: &'a str,
    entry_type: &'a str,
    year: &'a str,
    tier: &'static str,
    score: f64,
    exclusion: &'a str,
}

/// One row per classified record, tier order.
pub fn write_classified_csv(results: &ClassificationResults, path: &Path) -> Result<()> {
    create_parent_dirs(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    let mut rows = 0usize;
    for scored in results.all_records() {
        let r = &scored.record;
        writer.serialize(ClassifiedRow {
            key: &r.key,
            citation_key: &r.citation_key,
            source: &r.source,
            entry_type: &r.entry_type,
            year: r.year(),
            tier: scored.tier.as_str(),
            score: scored.score,
            exclusion: scored.exclusion.as_deref().unwrap_or(""),
        })?;
        rows += 1;
    }
    writer.flush()?;
    info!(path = %path.display(), rows, "Classified records written");
    Ok(())
}

// ── Markdown over the filtered bibliography ──────────────────────────────────

/// Articles scoring at least `threshold`, best first, newest first on ties.
pub fn render_excellence_markdown(entries: &[FilteredEntry], threshold: f64) -> String {
    let mut selected: Vec<&FilteredEntry> = entries.iter().filter(|e| e.score >= threshold).collect();
    selected.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.record.get("year").unwrap_or("0000").cmp(a.record.get("year").unwrap_or("0000")))
    });

    let mut out = String::new();
    let _ = writeln!(out, "# Detailed Analysis of Excellence Articles\n");
    let _ = writeln!(out, "**Total selected articles:** {}", selected.len());
    let _ = writeln!(out, "**Inclusion criterion:** relevance score >= {threshold:.1}\n");
    let _ = writeln!(
        out,
        "Studies with the strongest overlap between machine learning and traditional \
         agricultural systems, {} articles in total.\n",
        selected.len()
    );
    let _ = writeln!(out, "## Article List\n");

    for (i, entry) in selected.iter().enumerate() {
        let r = &entry.record;
        let journal = r.get("journal").or_else(|| r.get("booktitle")).unwrap_or("N/A");
        let keywords = r.keywords();

        let _ = writeln!(out, "### {}. {}\n", i + 1, r.get("title").unwrap_or("Untitled"));
        let _ = writeln!(out, "- **Year:** {}", r.get("year").unwrap_or("N/A"));
        let _ = writeln!(out, "- **Journal:** {journal}");
        let _ = writeln!(out, "- **Authors:** {}", r.get("author").unwrap_or("Unknown"));
        let _ = writeln!(out, "- **Score:** {:.1} ({})", entry.score, entry.source);
        if let Some(doi) = r.get("doi") {
            let _ = writeln!(out, "- **DOI:** [{doi}](https://doi.org/{doi})");
        }
        if !keywords.is_empty() {
            let _ = writeln!(out, "\n**Keywords:** {keywords}");
        }
        if let Some(abstract_text) = r.get("abstract") {
            let _ = writeln!(out, "\n> **Abstract:** {abstract_text}");
        }
        let _ = writeln!(out, "\n---\n");
    }
    out
}

/// Articles with `lower <= score < upper`, best first.
pub fn render_high_relevance_markdown(entries: &[FilteredEntry], lower: f64, upper: f64) -> String {
    let mut selected: Vec<&FilteredEntry> = entries
        .iter()
        .filter(|e| e.score >= lower && e.score < upper)
        .collect();
    selected.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut out = String::new();
    let _ = writeln!(out, "# High-Relevance Articles (score {lower:.1} to {upper:.1})\n");
    let _ = writeln!(out, "Total: {} articles\n", selected.len());
    for (i, entry) in selected.iter().enumerate() {
        let r = &entry.record;
        let _ = writeln!(out, "## {}. {}", i + 1, r.title());
        let _ = writeln!(out, "- **Authors:** {}", r.author());
        let _ = writeln!(out, "- **Year:** {} | **Journal:** {}", r.year(), r.field("journal"));
        let _ = writeln!(out, "- **Score:** {:.1} | **Source:** {}", entry.score, entry.source);
        let _ = writeln!(out, "- **Abstract:** {}...\n", truncate_chars(r.abstract_text(), HIGH_ABSTRACT_CHARS));
        let _ = writeln!(out, "---");
    }
    out
}
