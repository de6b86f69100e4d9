//! FAIR-likeness proxy scored from bibliographic metadata.
//!
//! Each study gets flags mined from its title, abstract, keywords,
//! affiliations, DOI and URL, then four sub-scores of at most 25 points:
//!
//! | Dimension     | Points                                              |
//! |---------------|-----------------------------------------------------|
//! | Findable      | DOI 10, metadata richness 15 / 7 / 0                |
//! | Accessible    | repository 15, supplementary material 10            |
//! | Interoperable | standard format 15, controlled vocabulary 10        |
//! | Reusable      | licence 8, code 10 / 5 / 0, documentation 7 / 3 / 0 |

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use satrev_common::{Result, SatrevError};
use satrev_ingestion::FilteredEntry;
use serde::Serialize;
use tracing::{debug, info};

use crate::filter::{DomainFilter, StudyText};
use crate::output::{sim_nao, write_csv};

pub const DIMENSIONS_FILE: &str = "scores_por_dimensao_sat.csv";
pub const INDICATORS_FILE: &str = "indicadores_fair_detalhados_sat.csv";
pub const STUDIES_FILE: &str = "fair_estudos_sat.csv";

pub const DIMENSION_MAX: u32 = 25;

// ── Flags ─────────────────────────────────────────────────────────────────────

/// Three-level availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Yes,
    Partial,
    No,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Yes     => "Sim",
            Level::Partial => "Parcial",
            Level::No      => "Não",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Documentation {
    Complete,
    Partial,
    Insufficient,
}

impl Documentation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Documentation::Complete     => "Completa",
            Documentation::Partial      => "Parcial",
            Documentation::Insufficient => "Insuficiente",
        }
    }
}

fn doi_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b10\.\d{4,9}/\S+\b").unwrap())
}

fn forge_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(github\.com|gitlab\.com|bitbucket\.org)\b").unwrap())
}

fn repository_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(zenodo|figshare|osf\.io|open science framework|dataverse|dryad|mendeley data|kaggle|pangaea)\b",
        )
        .unwrap()
    })
}

fn code_phrase_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(source code|code available|code is available|open-source|open source)\b").unwrap()
    })
}

fn license_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(cc-by|creative commons|license|licence|mit license|apache)\b").unwrap())
}

fn format_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(csv|geotiff|tiff|netcdf|hdf5|shapefile|geojson|json|xml)\b").unwrap())
}

fn vocabulary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(agrovoc|ontology|controlled vocabulary|thesaurus)\b").unwrap())
}

fn supplementary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(supplementary|supporting information|appendix)\b").unwrap())
}

fn api_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(api|rest api|endpoint)\b").unwrap())
}

// ── Assessment ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FairAssessment {
    pub study_id: String,
    pub year: Option<i32>,
    pub doi_available: bool,
    pub metadata_richness: Level,
    pub repository: bool,
    pub supplementary: bool,
    pub standard_format: bool,
    pub controlled_vocabulary: bool,
    pub license: bool,
    pub code: Level,
    pub documentation: Documentation,
    pub blockchain: bool,
    pub api: bool,
    pub score_f: u32,
    pub score_a: u32,
    pub score_i: u32,
    pub score_r: u32,
}

impl FairAssessment {
    pub fn assess(study: &StudyText) -> Self {
        let blob = study.blob_with_links();
        let abstract_len = study.abstract_text.trim().chars().count();

        let doi_available = !study.doi.trim().is_empty()
            || study.url.to_lowercase().contains("doi.org/")
            || doi_regex().is_match(&blob);

        let rich_abstract = abstract_len >= 80;
        let metadata_richness = match (rich_abstract, study.has_keywords()) {
            (true, true) => Level::Yes,
            (true, false) | (false, true) => Level::Partial,
            (false, false) => Level::No,
        };

        let forge = forge_regex().is_match(&blob);
        let repository = forge || repository_regex().is_match(&blob);
        let code = if forge {
            Level::Yes
        } else if code_phrase_regex().is_match(&blob) {
            Level::Partial
        } else {
            Level::No
        };
        let documentation = if code == Level::Yes && abstract_len >= 200 {
            Documentation::Complete
        } else if abstract_len >= 120 {
            Documentation::Partial
        } else {
            Documentation::Insufficient
        };

        let supplementary = supplementary_regex().is_match(&blob);
        let standard_format = format_regex().is_match(&blob);
        let controlled_vocabulary = vocabulary_regex().is_match(&blob);
        let license = license_regex().is_match(&blob);

        let score_f = if doi_available { 10 } else { 0 }
            + match metadata_richness {
                Level::Yes => 15,
                Level::Partial => 7,
                Level::No => 0,
            };
        let score_a = if repository { 15 } else { 0 } + if supplementary { 10 } else { 0 };
        let score_i = if standard_format { 15 } else { 0 } + if controlled_vocabulary { 10 } else { 0 };
        let score_r = if license { 8 } else { 0 }
            + match code {
                Level::Yes => 10,
                Level::Partial => 5,
                Level::No => 0,
            }
            + match documentation {
                Documentation::Complete => 7,
                Documentation::Partial => 3,
                Documentation::Insufficient => 0,
            };

        Self {
            study_id: study.key.clone(),
            year: study.year,
            doi_available,
            metadata_richness,
            repository,
            supplementary,
            standard_format,
            controlled_vocabulary,
            license,
            code,
            documentation,
            blockchain: blob.contains("blockchain"),
            api: api_regex().is_match(&blob),
            score_f,
            score_a,
            score_i,
            score_r,
        }
    }

    pub fn total(&self) -> u32 {
        self.score_f + self.score_a + self.score_i + self.score_r
    }
}

// ── Tables ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionScore {
    pub dimensao: &'static str,
    pub score_medio: f64,
    pub score_max_possivel: u32,
    pub percentual: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub indicador: &'static str,
    pub n_sim: usize,
    pub percentual: f64,
    pub gap: f64,
    pub indicador_en: &'static str,
}

#[derive(Debug, Serialize)]
struct StudyRow<'a> {
    estudo_id: &'a str,
    ano: Option<i32>,
    doi_disponivel: &'static str,
    metadados_ricos: &'static str,
    dados_repositorio: &'static str,
    dados_suplementares: &'static str,
    formato_padrao: &'static str,
    vocabulario_controlado: &'static str,
    licenca_clara: &'static str,
    codigo_disponivel: &'static str,
    documentacao_metodo: &'static str,
    blockchain: &'static str,
    api_disponivel: &'static str,
    score_f: u32,
    score_a: u32,
    score_i: u32,
    score_r: u32,
    score_fair: u32,
    compliant: &'static str,
}

#[derive(Debug, Clone)]
pub struct FairDataset {
    pub studies: Vec<FairAssessment>,
    pub compliance_threshold: u32,
}

type IndicatorSpec = (&'static str, &'static str, fn(&FairAssessment) -> bool);

const INDICATORS: &[IndicatorSpec] = &[
    ("DOI disponível", "DOI available", |a| a.doi_available),
    ("Metadados ricos", "Rich metadata", |a| a.metadata_richness == Level::Yes),
    ("Dados em repositório", "Data in repository", |a| a.repository),
    ("Dados suplementares", "Supplementary data", |a| a.supplementary),
    ("Formato padrão", "Standard format", |a| a.standard_format),
    ("Vocabulário controlado", "Controlled vocabulary", |a| a.controlled_vocabulary),
    ("Licença clara", "Clear license", |a| a.license),
    ("Código disponível", "Code available", |a| a.code == Level::Yes),
    ("Documentação completa", "Complete documentation", |a| a.documentation == Documentation::Complete),
    ("Blockchain", "Blockchain", |a| a.blockchain),
    ("API disponível", "API available", |a| a.api),
];

impl FairDataset {
    pub fn compliant(&self, assessment: &FairAssessment) -> bool {
        assessment.total() >= self.compliance_threshold
    }

    pub fn compliant_count(&self) -> usize {
        self.studies.iter().filter(|a| self.compliant(a)).count()
    }

    /// Mean sub-score per dimension, Findable to Reusable.
    pub fn dimension_scores(&self) -> Vec<DimensionScore> {
        let n = self.studies.len().max(1) as f64;
        let mean = |f: fn(&FairAssessment) -> u32| self.studies.iter().map(|a| f(a) as f64).sum::<f64>() / n;
        [
            ("Findable", mean(|a| a.score_f)),
            ("Accessible", mean(|a| a.score_a)),
            ("Interoperable", mean(|a| a.score_i)),
            ("Reusable", mean(|a| a.score_r)),
        ]
        .into_iter()
        .map(|(dimensao, score_medio)| DimensionScore {
            dimensao,
            score_medio,
            score_max_possivel: DIMENSION_MAX,
            percentual: score_medio / DIMENSION_MAX as f64 * 100.0,
        })
        .collect()
    }

    /// Share of studies meeting each indicator, highest first.
    pub fn indicators(&self) -> Vec<IndicatorRow> {
        let n = self.studies.len().max(1) as f64;
        let mut rows: Vec<IndicatorRow> = INDICATORS
            .iter()
            .map(|&(pt, en, pred)| {
                let n_sim = self.studies.iter().filter(|a| pred(a)).count();
                let percentual = n_sim as f64 / n * 100.0;
                IndicatorRow { indicador: pt, n_sim, percentual, gap: 100.0 - percentual, indicador_en: en }
            })
            .collect();
        rows.sort_by(|a, b| b.percentual.total_cmp(&a.percentual));
        rows
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        write_csv(&dir.join(DIMENSIONS_FILE), &self.dimension_scores())?;
        write_csv(&dir.join(INDICATORS_FILE), &self.indicators())?;

        let rows: Vec<StudyRow<'_>> = self
            .studies
            .iter()
            .map(|a| StudyRow {
                estudo_id: &a.study_id,
                ano: a.year,
                doi_disponivel: sim_nao(a.doi_available),
                metadados_ricos: a.metadata_richness.as_str(),
                dados_repositorio: sim_nao(a.repository),
                dados_suplementares: sim_nao(a.supplementary),
                formato_padrao: sim_nao(a.standard_format),
                vocabulario_controlado: sim_nao(a.controlled_vocabulary),
                licenca_clara: sim_nao(a.license),
                codigo_disponivel: a.code.as_str(),
                documentacao_metodo: a.documentation.as_str(),
                blockchain: sim_nao(a.blockchain),
                api_disponivel: sim_nao(a.api),
                score_f: a.score_f,
                score_a: a.score_a,
                score_i: a.score_i,
                score_r: a.score_r,
                score_fair: a.total(),
                compliant: sim_nao(self.compliant(a)),
            })
            .collect();
        write_csv(&dir.join(STUDIES_FILE), &rows)
    }
}

/// Score every qualifying study of the filtered bibliography.
pub fn build_fair(entries: &[FilteredEntry], filter: &DomainFilter, compliance_threshold: u32) -> Result<FairDataset> {
    let mut studies = Vec::new();
    for entry in entries {
        let study = StudyText::from_entry(entry);
        let blob = study.blob_with_links();
        if !filter.qualifies(&blob) {
            debug!(key = %study.key, "Skipping study outside the SAT domain");
            continue;
        }
        studies.push(FairAssessment::assess(&study));
    }

    if studies.is_empty() {
        return Err(SatrevError::EmptyResult(
            "no SAT study qualified for FAIR scoring; check the domain filter terms".into(),
        ));
    }

    let dataset = FairDataset { studies, compliance_threshold };
    info!(
        studies = dataset.studies.len(),
        compliant = dataset.compliant_count(),
        "FAIR proxy scored"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn study(abstract_text: &str) -> StudyText {
        StudyText {
            key: "S1".into(),
            year: Some(2020),
            title: "Swidden mapping".into(),
            abstract_text: abstract_text.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_bare_study_scores_low() {
        let a = FairAssessment::assess(&study("Short."));
        assert!(!a.doi_available);
        assert_eq!(a.metadata_richness, Level::No);
        assert_eq!(a.code, Level::No);
        assert_eq!(a.documentation, Documentation::Insufficient);
        assert_eq!(a.total(), 0);
    }

    #[test]
    fn test_open_study_scores_high() {
        let text = format!(
            "{} Code and data at github.com/lab/swidden, released under a Creative Commons licence \
             as GeoTIFF and CSV with AGROVOC terms. Supplementary tables describe the REST API.",
            "x".repeat(200)
        );
        let mut s = study(&text);
        s.author_keywords = "swidden".into();
        s.doi = "10.1000/abc".into();
        let a = FairAssessment::assess(&s);

        assert_eq!(a.score_f, 25);
        assert_eq!(a.score_a, 25);
        assert_eq!(a.score_i, 25);
        assert_eq!(a.code, Level::Yes);
        assert_eq!(a.documentation, Documentation::Complete);
        assert_eq!(a.score_r, 25);
        assert!(a.api);
        assert!(!a.blockchain);
    }

    #[test]
    fn test_code_phrase_is_partial() {
        let a = FairAssessment::assess(&study("The source code is shared on request."));
        assert_eq!(a.code, Level::Partial);
        assert!(!a.repository);
        assert_eq!(a.score_r, 5);
    }

    #[test]
    fn test_doi_from_url_or_text() {
        let mut s = study("");
        s.url = "https://doi.org/10.1/x".into();
        assert!(FairAssessment::assess(&s).doi_available);

        let s = study("Data: 10.5281/zenodo.12345 archived.");
        let a = FairAssessment::assess(&s);
        assert!(a.doi_available);
        assert!(a.repository);
    }

    #[test]
    fn test_word_boundaries_on_flags() {
        // "rapid" must not fire the api flag, "xmlish" not the format flag.
        let a = FairAssessment::assess(&study("rapid xmlish csvs"));
        assert!(!a.api);
        assert!(!a.standard_format);
    }

    fn dataset() -> FairDataset {
        let mut rich = study(&"y".repeat(90));
        rich.keywords = "swidden".into();
        rich.doi = "10.1/a".into();
        FairDataset {
            studies: vec![FairAssessment::assess(&rich), FairAssessment::assess(&study("api"))],
            compliance_threshold: 50,
        }
    }

    #[test]
    fn test_dimension_means() {
        let dims = dataset().dimension_scores();
        assert_eq!(dims.len(), 4);
        assert_eq!(dims[0].dimensao, "Findable");
        assert_eq!(dims[0].score_medio, 12.5);
        assert_eq!(dims[0].percentual, 50.0);
        assert_eq!(dims[3].score_max_possivel, 25);
    }

    #[test]
    fn test_indicators_sorted_desc() {
        let rows = dataset().indicators();
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[0].percentual, 50.0);
        assert!(rows.windows(2).all(|w| w[0].percentual >= w[1].percentual));
        // Stable: DOI precedes Rich metadata and API at 50 %.
        assert_eq!(rows[0].indicador, "DOI disponível");
        assert_eq!(rows[1].indicador, "Metadados ricos");
        assert_eq!(rows[2].indicador_en, "API available");
        assert_eq!(rows[3].gap, 100.0);
    }

    #[test]
    fn test_build_requires_qualifying_study() {
        let err = build_fair(&[], &DomainFilter::default(), 50).unwrap_err();
        assert!(matches!(err, SatrevError::EmptyResult(_)));
    }

    #[test]
    fn test_write_tables() {
        let dir = tempfile::tempdir().unwrap();
        dataset().write(dir.path()).unwrap();
        let dims = std::fs::read_to_string(dir.path().join(DIMENSIONS_FILE)).unwrap();
        assert!(dims.starts_with("dimensao,score_medio,score_max_possivel,percentual\nFindable,12.5,25,50.0\n"));
        let studies = std::fs::read_to_string(dir.path().join(STUDIES_FILE)).unwrap();
        assert!(studies.lines().nth(1).unwrap().starts_with("S1,2020,Sim,Sim,Não"));
    }
}
