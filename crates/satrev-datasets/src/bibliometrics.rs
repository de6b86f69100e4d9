//! Keyword and country frequencies of the filtered bibliography.

use std::collections::BTreeMap;
use std::fmt::Write;

use satrev_ingestion::FilteredEntry;
use tracing::info;

use crate::filter::StudyText;

pub const TOP_KEYWORDS: usize = 20;
pub const TOP_COUNTRIES: usize = 15;

/// Matched as substrings of the lower-cased affiliation text.
pub const COUNTRY_NAMES: &[&str] = &[
    "usa",
    "united states",
    "china",
    "india",
    "brazil",
    "brasil",
    "germany",
    "france",
    "italy",
    "spain",
    "australia",
    "canada",
    "united kingdom",
    "uk",
    "japan",
    "indonesia",
    "malaysia",
    "vietnam",
    "thailand",
    "mexico",
    "colombia",
    "peru",
    "argentina",
];

/// Display name for a country variant.
pub fn canonical_country(name: &str) -> String {
    match name {
        "usa" | "united states" => "USA".to_string(),
        "brazil" | "brasil" => "Brazil".to_string(),
        "uk" | "united kingdom" => "UK".to_string(),
        other => title_case(other),
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Occurrence counter that remembers first-appearance order.
#[derive(Debug, Default)]
struct Tally {
    order: Vec<(String, usize)>,
    index: BTreeMap<String, usize>,
}

impl Tally {
    fn add(&mut self, item: String) {
        match self.index.get(&item) {
            Some(&pos) => self.order[pos].1 += 1,
            None => {
                self.index.insert(item.clone(), self.order.len());
                self.order.push((item, 1));
            }
        }
    }

    fn top(mut self, n: usize) -> Vec<(String, usize)> {
        self.order.sort_by(|a, b| b.1.cmp(&a.1));
        self.order.truncate(n);
        self.order
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BibliometricSummary {
    pub articles: usize,
    pub keywords: Vec<(String, usize)>,
    pub countries: Vec<(String, usize)>,
}

impl BibliometricSummary {
    pub fn from_entries(entries: &[FilteredEntry]) -> Self {
        let mut keywords = Tally::default();
        let mut countries = Tally::default();

        for entry in entries {
            let study = StudyText::from_entry(entry);

            let joined = format!("{} {}", study.keywords, study.author_keywords);
            for part in joined.split([';', ',']) {
                let keyword = part.trim().to_lowercase();
                if keyword.chars().count() > 2 {
                    keywords.add(keyword);
                }
            }

            let location = study.location();
            let mut seen: Vec<String> = Vec::new();
            for name in COUNTRY_NAMES.iter().filter(|n| location.contains(*n)) {
                let country = canonical_country(name);
                if !seen.contains(&country) {
                    seen.push(country);
                }
            }
            for country in seen {
                countries.add(country);
            }
        }

        let summary = Self {
            articles: entries.len(),
            keywords: keywords.top(TOP_KEYWORDS),
            countries: countries.top(TOP_COUNTRIES),
        };
        info!(
            articles = summary.articles,
            keywords = summary.keywords.len(),
            countries = summary.countries.len(),
            "Bibliometric summary computed"
        );
        summary
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Bibliometric Analysis\n");
        let _ = writeln!(out, "Based on {} filtered articles.\n", self.articles);

        let _ = writeln!(out, "## Top {} Keywords", TOP_KEYWORDS);
        let _ = writeln!(out, "| Keyword | Frequency |");
        let _ = writeln!(out, "|---|---|");
        for (keyword, count) in &self.keywords {
            let _ = writeln!(out, "| {} | {} |", keyword, count);
        }

        let _ = writeln!(out, "\n## Top {} Countries (from affiliations)", TOP_COUNTRIES);
        let _ = writeln!(out, "| Country | Articles |");
        let _ = writeln!(out, "|---|---|");
        for (country, count) in &self.countries {
            let _ = writeln!(out, "| {} | {} |", country, count);
        }
        out
    }
}
