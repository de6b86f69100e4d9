//! Domain filter shared by every dataset builder.
//!
//! A study qualifies when its text mentions at least one traditional
//! agricultural system (SAT) term and no product-authentication term.

use satrev_common::text::{contains_any, first_year};
use satrev_ingestion::FilteredEntry;

pub const SAT_TERMS: &[&str] = &[
    "traditional agricultural system",
    "traditional farming system",
    "traditional agriculture",
    "traditional agroecosystem",
    "sistemas agrícolas tradicionais",
    "sistema agrícola tradicional",
    "agricultura tradicional",
    "agroecolog",
    "socioecological system",
    "socio-ecological system",
    "biocultural",
    "cultural landscape",
    "agrobiodiversity",
    "traditional knowledge",
    "indigenous knowledge",
    "local knowledge",
    "shifting cultivation",
    "slash-and-burn",
    "swidden",
];

/// Geographical-indication and food-authentication topics.
pub const PRODUCT_EXCLUSION_TERMS: &[&str] = &[
    "geographical indication",
    "geographical indications",
    "protected designation of origin",
    "protected geographical indication",
    "denomination of origin",
    "pdo",
    "pgi",
    "origin detection",
    "food fraud",
    "adulteration",
    "wine",
    "honey",
    "cheese",
    "olive",
    "coffee",
    "tea",
];

#[derive(Debug, Clone)]
pub struct DomainFilter {
    pub sat_terms: Vec<String>,
    pub exclusion_terms: Vec<String>,
}

impl Default for DomainFilter {
    fn default() -> Self {
        Self {
            sat_terms: SAT_TERMS.iter().map(|t| t.to_string()).collect(),
            exclusion_terms: PRODUCT_EXCLUSION_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl DomainFilter {
    /// `blob` must already be lower-cased.
    pub fn is_sat(&self, blob: &str) -> bool {
        contains_any(blob, &self.sat_terms)
    }

    pub fn is_excluded(&self, blob: &str) -> bool {
        contains_any(blob, &self.exclusion_terms)
    }

    pub fn qualifies(&self, blob: &str) -> bool {
        self.is_sat(blob) && !self.is_excluded(blob)
    }
}

/// The text fields of one filtered entry the builders look at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudyText {
    pub key: String,
    pub year: Option<i32>,
    pub title: String,
    pub abstract_text: String,
    pub keywords: String,
    pub author_keywords: String,
    pub affiliations: String,
    pub address: String,
    pub doi: String,
    pub url: String,
}

impl StudyText {
    pub fn from_entry(entry: &FilteredEntry) -> Self {
        let r = &entry.record;
        Self {
            key: r.citation_key.clone(),
            year: first_year(r.year()),
            title: r.title().to_string(),
            abstract_text: r.abstract_text().to_string(),
            keywords: r.field("keywords").to_string(),
            author_keywords: r.field("author_keywords").to_string(),
            affiliations: r.field("affiliations").to_string(),
            address: r.field("address").to_string(),
            doi: r.field("doi").to_string(),
            url: r.field("url").to_string(),
        }
    }

    /// Title, abstract, keywords and affiliations, lower-cased.
    pub fn blob(&self) -> String {
        [
            self.title.as_str(),
            &self.abstract_text,
            &self.keywords,
            &self.author_keywords,
            &self.affiliations,
            &self.address,
        ]
        .join(" ")
        .to_lowercase()
    }

    /// [`Self::blob`] plus DOI and URL.
    pub fn blob_with_links(&self) -> String {
        format!("{} {} {}", self.blob(), self.doi.to_lowercase(), self.url.to_lowercase())
    }

    /// Affiliations and address, lower-cased.
    pub fn location(&self) -> String {
        format!("{} {}", self.affiliations, self.address).to_lowercase()
    }

    /// Title, abstract and both keyword fields.
    pub fn findings(&self) -> String {
        [self.title.as_str(), &self.abstract_text, &self.keywords, &self.author_keywords].join(" ")
    }

    pub fn has_keywords(&self) -> bool {
        !self.keywords.trim().is_empty() || !self.author_keywords.trim().is_empty()
    }
}
