//! Categorical dataset for multiple correspondence analysis.
//!
//! One row per SAT study with a known year, labelled along six axes:
//! period, algorithm, evidence source, context, application and region.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use satrev_common::{Result, SatrevError};
use satrev_ingestion::FilteredEntry;
use serde::Serialize;
use tracing::info;

use crate::filter::{DomainFilter, StudyText};
use crate::output::write_csv;

pub const MCA_FILE: &str = "mca_dados_categorizados_sat.csv";

// ── Rules ─────────────────────────────────────────────────────────────────────

/// First matching pattern wins.
const ALGORITHM_RULES: &[(&str, &str)] = &[
    (r"\b(transformer|bert|vit|vision transformer)\b", "DeepLearning"),
    (r"\b(cnn|convolutional neural network|deep learning|lstm|rnn|gru)\b", "DeepLearning"),
    (r"\b(random forest|random forests)\b", "RandomForest"),
    (r"\b(svm|support vector machine|support vector machines)\b", "SVM"),
    (r"\b(xgboost|lightgbm|gradient boosting|boosting)\b", "Boosting"),
    (r"\b(decision tree|cart)\b", "DecisionTree"),
    (r"\b(knn|k-nearest neighbor|k nearest neighbour)\b", "KNN"),
    (r"\b(linear regression|logistic regression|multilinear regression|regression)\b", "Regression"),
    (r"\b(naive bayes)\b", "NaiveBayes"),
    (r"\b(k-means|kmeans|clustering|hierarchical clustering)\b", "Clustering"),
];

pub const COUNTRY_TO_REGION: &[(&str, &str)] = &[
    ("usa", "Americas"),
    ("united states", "Americas"),
    ("canada", "Americas"),
    ("mexico", "Americas"),
    ("brazil", "Americas"),
    ("brasil", "Americas"),
    ("peru", "Americas"),
    ("colombia", "Americas"),
    ("argentina", "Americas"),
    ("chile", "Americas"),
    ("uk", "Europe"),
    ("united kingdom", "Europe"),
    ("france", "Europe"),
    ("germany", "Europe"),
    ("italy", "Europe"),
    ("spain", "Europe"),
    ("portugal", "Europe"),
    ("netherlands", "Europe"),
    ("sweden", "Europe"),
    ("norway", "Europe"),
    ("china", "Asia"),
    ("india", "Asia"),
    ("indonesia", "Asia"),
    ("malaysia", "Asia"),
    ("vietnam", "Asia"),
    ("thailand", "Asia"),
    ("japan", "Asia"),
    ("nepal", "Asia"),
    ("laos", "Asia"),
    ("myanmar", "Asia"),
    ("cambodia", "Asia"),
    ("south africa", "Africa"),
    ("tanzania", "Africa"),
    ("madagascar", "Africa"),
    ("kenya", "Africa"),
    ("ethiopia", "Africa"),
    ("australia", "Oceania"),
    ("new zealand", "Oceania"),
];

fn algorithm_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        ALGORITHM_RULES
            .iter()
            .map(|(pattern, label)| (Regex::new(pattern).unwrap(), *label))
            .collect()
    })
}

fn satellite_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(sentinel|landsat|modis|worldview|planet|alos|aster|satellite)\b").unwrap()
    })
}

fn uav_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(uav|drone|unmanned aerial)\b").unwrap())
}

fn gis_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(gis|geospatial|geographic information system)\b").unwrap())
}

fn time_series_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(time series|timeseries|multi-temporal|temporal)\b").unwrap())
}

fn swidden_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(shifting cultivation|swidden|slash-and-burn|slash and burn)\b").unwrap())
}

fn traditional_system_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(traditional agricultural system|traditional farming system|traditional agroecosystem)\b")
            .unwrap()
    })
}

fn traditional_knowledge_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(indigenous knowledge|traditional knowledge|local knowledge|ilk)\b").unwrap()
    })
}

fn land_use_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(lulc|land use|land-use|land cover|land-cover)\b").unwrap())
}

fn yield_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(yield|crop yield|yield prediction|rice-yield)\b").unwrap())
}

// ── Inference ─────────────────────────────────────────────────────────────────

/// Years before 2010 fold into the first period, after 2025 into the last.
pub fn infer_period(year: i32) -> &'static str {
    match year {
        ..=2014 => "2010-14",
        2015..=2019 => "2015-19",
        _ => "2020-25",
    }
}

/// `blob` must be lower-cased, as for every `infer_*` below.
pub fn infer_algorithm(blob: &str) -> &'static str {
    algorithm_rules()
        .iter()
        .find(|(re, _)| re.is_match(blob))
        .map(|(_, label)| *label)
        .unwrap_or("Other")
}

pub fn infer_evidence(blob: &str) -> &'static str {
    let satellite = satellite_regex().is_match(blob);
    let uav = uav_regex().is_match(blob);
    let gis = gis_regex().is_match(blob);
    let hyperspectral = blob.contains("hyperspectral");
    let multispectral = blob.contains("multispectral");
    let time_series = time_series_regex().is_match(blob);

    let flags = [satellite, uav, gis, hyperspectral, multispectral, time_series];
    if flags.iter().filter(|f| **f).count() >= 2 {
        return "Hybrid";
    }
    if satellite {
        "Satellite"
    } else if uav {
        "UAV"
    } else if hyperspectral {
        "Hyperspectral"
    } else if multispectral {
        "Multispectral"
    } else if time_series {
        "TimeSeries"
    } else if gis {
        "GIS"
    } else if blob.contains("remote sensing") {
        "RemoteSensing"
    } else {
        "Other"
    }
}

pub fn infer_context(blob: &str) -> &'static str {
    if blob.contains("agroforestry") {
        "Agroforestry"
    } else if swidden_regex().is_match(blob) {
        "Swidden"
    } else if traditional_system_regex().is_match(blob) {
        "TraditionalSystem"
    } else if traditional_knowledge_regex().is_match(blob) {
        "TraditionalKnowledge"
    } else if blob.contains("biocultural") || blob.contains("cultural landscape") {
        "Biocultural"
    } else {
        "SAT-General"
    }
}

pub fn infer_application(blob: &str) -> &'static str {
    if land_use_regex().is_match(blob) {
        "LULC"
    } else if blob.contains("deforestation") || blob.contains("forest loss") {
        "Deforestation"
    } else if yield_regex().is_match(blob) {
        "Yield"
    } else if blob.contains("carbon") && (blob.contains("stock") || blob.contains("sequestration")) {
        "Carbon"
    } else if blob.contains("biodiversity") {
        "Biodiversity"
    } else if blob.contains("soil") {
        "Soil"
    } else if blob.contains("mapping") {
        "Mapping"
    } else if blob.contains("monitor") {
        "Monitoring"
    } else if blob.contains("classification") {
        "Classification"
    } else {
        "Other"
    }
}

/// Region from lower-cased affiliation text. Countries on two or more
/// continents make the study Global.
pub fn infer_region(location: &str) -> &'static str {
    let regions: BTreeSet<&'static str> = COUNTRY_TO_REGION
        .iter()
        .filter(|(country, _)| location.contains(country))
        .map(|(_, region)| *region)
        .collect();

    if regions.len() >= 2 {
        return "Global";
    }
    if let Some(region) = regions.first() {
        return region;
    }

    if ["amazon", "peru", "brazil", "brasil"].iter().any(|t| location.contains(t)) {
        "Americas"
    } else if location.contains("africa") {
        "Africa"
    } else if location.contains("europe") {
        "Europe"
    } else if location.contains("asia") {
        "Asia"
    } else {
        "Global"
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McaRow {
    #[serde(rename = "ID")]
    pub id: usize,
    #[serde(rename = "Ano")]
    pub year: i32,
    #[serde(rename = "Periodo")]
    pub period: &'static str,
    #[serde(rename = "Algoritmo")]
    pub algorithm: &'static str,
    #[serde(rename = "Evidencia")]
    pub evidence: &'static str,
    #[serde(rename = "Contexto")]
    pub context: &'static str,
    #[serde(rename = "Aplicacao")]
    pub application: &'static str,
    #[serde(rename = "Regiao")]
    pub region: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct McaExclusions {
    pub product: usize,
    pub not_sat: usize,
    pub no_year: usize,
}

#[derive(Debug, Clone)]
pub struct McaDataset {
    pub rows: Vec<McaRow>,
    pub excluded: McaExclusions,
}

impl McaDataset {
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let min = self.rows.iter().map(|r| r.year).min()?;
        let max = self.rows.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        write_csv(&dir.join(MCA_FILE), &self.rows)
    }
}

/// Label every qualifying study. IDs are 1-based positions in `entries`,
/// so gaps mark the excluded studies.
pub fn build_mca(entries: &[FilteredEntry], filter: &DomainFilter) -> Result<McaDataset> {
    let mut rows = Vec::new();
    let mut excluded = McaExclusions::default();

    for (idx, entry) in entries.iter().enumerate() {
        let study = StudyText::from_entry(entry);
        let blob = study.blob();

        if filter.is_excluded(&blob) {
            excluded.product += 1;
            continue;
        }
        if !filter.is_sat(&blob) {
            excluded.not_sat += 1;
            continue;
        }
        let Some(year) = study.year else {
            excluded.no_year += 1;
            continue;
        };

        rows.push(McaRow {
            id: idx + 1,
            year,
            period: infer_period(year),
            algorithm: infer_algorithm(&blob),
            evidence: infer_evidence(&blob),
            context: infer_context(&blob),
            application: infer_application(&blob),
            region: infer_region(&study.location()),
        });
    }

    info!(
        entries = entries.len(),
        kept = rows.len(),
        excluded_product = excluded.product,
        excluded_not_sat = excluded.not_sat,
        excluded_no_year = excluded.no_year,
        "MCA dataset built"
    );

    if rows.is_empty() {
        return Err(SatrevError::EmptyResult(
            "no reference was classified as SAT; review the SAT and exclusion term lists".into(),
        ));
    }
    Ok(McaDataset { rows, excluded })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use satrev_ingestion::BibRecord;

    #[test]
    fn test_period_buckets() {
        assert_eq!(infer_period(1998), "2010-14");
        assert_eq!(infer_period(2014), "2010-14");
        assert_eq!(infer_period(2015), "2015-19");
        assert_eq!(infer_period(2020), "2020-25");
        assert_eq!(infer_period(2031), "2020-25");
    }

    #[test]
    fn test_algorithm_priority() {
        assert_eq!(infer_algorithm("random forest and cnn"), "DeepLearning");
        assert_eq!(infer_algorithm("random forests vs svm"), "RandomForest");
        assert_eq!(infer_algorithm("lightgbm"), "Boosting");
        assert_eq!(infer_algorithm("logistic regression"), "Regression");
        assert_eq!(infer_algorithm("k-means"), "Clustering");
        // "cart" must not fire inside "cartography".
        assert_eq!(infer_algorithm("participatory cartography"), "Other");
    }

    #[test]
    fn test_evidence() {
        assert_eq!(infer_evidence("landsat imagery"), "Satellite");
        assert_eq!(infer_evidence("drone survey with landsat"), "Hybrid");
        assert_eq!(infer_evidence("hyperspectral"), "Hyperspectral");
        assert_eq!(infer_evidence("a gis layer"), "GIS");
        assert_eq!(infer_evidence("remote sensing review"), "RemoteSensing");
        assert_eq!(infer_evidence("interviews"), "Other");
    }

    #[test]
    fn test_context_and_application() {
        assert_eq!(infer_context("swidden agroforestry"), "Agroforestry");
        assert_eq!(infer_context("slash and burn"), "Swidden");
        assert_eq!(infer_context("local knowledge"), "TraditionalKnowledge");
        assert_eq!(infer_context("agrobiodiversity"), "SAT-General");

        assert_eq!(infer_application("land-cover change and yield"), "LULC");
        assert_eq!(infer_application("soil carbon stock"), "Carbon");
        assert_eq!(infer_application("monitored plots"), "Monitoring");
        assert_eq!(infer_application("nothing"), "Other");
    }

    #[test]
    fn test_region() {
        assert_eq!(infer_region("kathmandu, nepal"), "Asia");
        assert_eq!(infer_region("lima, peru; madrid, spain"), "Global");
        assert_eq!(infer_region("amazonas"), "Americas");
        assert_eq!(infer_region("west africa"), "Africa");
        assert_eq!(infer_region(""), "Global");
    }

    fn entry(key: &str, title: &str, year: Option<&str>, address: &str) -> FilteredEntry {
        let mut record = BibRecord::new(key, "article", "filtered").with_field("title", title);
        if let Some(y) = year {
            record = record.with_field("year", y);
        }
        if !address.is_empty() {
            record = record.with_field("address", address);
        }
        FilteredEntry { record, score: 5.0, source: "Scopus".into() }
    }

    #[test]
    fn test_build_counts_exclusions() {
        let entries = vec![
            entry("a", "Swidden mapping with Sentinel-2", Some("2021"), "Hanoi, Vietnam"),
            entry("b", "Swidden coffee", Some("2020"), ""),
            entry("c", "Urban heat", Some("2019"), ""),
            entry("d", "Swidden fallows", None, ""),
            entry("e", "Indigenous knowledge and random forest", Some("2012"), ""),
        ];
        let dataset = build_mca(&entries, &DomainFilter::default()).unwrap();

        assert_eq!(dataset.excluded, McaExclusions { product: 1, not_sat: 1, no_year: 1 });
        assert_eq!(dataset.rows.len(), 2);
        assert_eq!(
            dataset.rows[0],
            McaRow {
                id: 1,
                year: 2021,
                period: "2020-25",
                algorithm: "Other",
                evidence: "Satellite",
                context: "Swidden",
                application: "Mapping",
                region: "Asia",
            }
        );
        assert_eq!(dataset.rows[1].id, 5);
        assert_eq!(dataset.rows[1].algorithm, "RandomForest");
        assert_eq!(dataset.year_range(), Some((2012, 2021)));
    }

    #[test]
    fn test_build_empty_is_error() {
        let entries = vec![entry("c", "Urban heat", Some("2019"), "")];
        assert!(matches!(
            build_mca(&entries, &DomainFilter::default()),
            Err(SatrevError::EmptyResult(_))
        ));
    }

    #[test]
    fn test_write_header() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![entry("a", "Swidden", Some("2016"), "")];
        build_mca(&entries, &DomainFilter::default()).unwrap().write(dir.path()).unwrap();
        let text = std::fs::read_to_string(dir.path().join(MCA_FILE)).unwrap();
        assert_eq!(
            text,
            "ID,Ano,Periodo,Algoritmo,Evidencia,Contexto,Aplicacao,Regiao\n\
             1,2016,2015-19,Other,Other,Swidden,Other,Global\n"
        );
    }
}
