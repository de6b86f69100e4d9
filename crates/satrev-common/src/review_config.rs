//! Review run configuration.
//!
//! Reads `satrev.toml` from the current directory, or the path named by the
//! `SATREV_CONFIG` env var. Every field has a default matching the review's
//! directory layout, so a run without a config file uses relative paths.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SatrevError};

pub const CONFIG_ENV_VAR: &str = "SATREV_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "satrev.toml";

/// Complete configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Bibliographic exports, in priority order. The first one is the
    /// primary corpus for deduplication.
    #[serde(default = "default_inputs")]
    pub inputs: Vec<CorpusInput>,

    /// Where reports, the filtered bibliography and datasets are written.
    #[serde(default)]
    pub output: OutputConfig,

    /// Optional YAML file with alternate classifier term tables.
    #[serde(default)]
    pub classifier_config: Option<PathBuf>,

    #[serde(default)]
    pub datasets: DatasetConfig,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            inputs: default_inputs(),
            output: OutputConfig::default(),
            classifier_config: None,
            datasets: DatasetConfig::default(),
        }
    }
}

// ── Inputs ────────────────────────────────────────────────────────────────────

/// One bibliographic export and the label its records are tagged with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusInput {
    /// Source label, e.g. "Scopus". Appended to citation keys.
    pub label: String,
    pub path: PathBuf,
}

fn default_inputs() -> Vec<CorpusInput> {
    vec![
        CorpusInput { label: "Scopus".to_string(), path: PathBuf::from("scopus_export.bib") },
        CorpusInput { label: "WoS".to_string(),    path: PathBuf::from("wos_export.bib") },
    ]
}

// ── Outputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    #[serde(default = "default_filtered_bib")]
    pub filtered_bib: PathBuf,

    /// FAIR and MCA tables.
    #[serde(default = "default_datasets_dir")]
    pub datasets_dir: PathBuf,

    /// Meta-analysis tables.
    #[serde(default = "default_meta_dir")]
    pub meta_dir: PathBuf,
}

fn default_report_dir()   -> PathBuf { PathBuf::from("relatorios") }
fn default_filtered_bib() -> PathBuf {
    PathBuf::from("referencias_filtradas/referencias_scopus_wos_filtradas.bib")
}
fn default_datasets_dir() -> PathBuf { PathBuf::from("datasets") }
fn default_meta_dir()     -> PathBuf { PathBuf::from("datasets/meta_analise") }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: default_report_dir(),
            filtered_bib: default_filtered_bib(),
            datasets_dir: default_datasets_dir(),
            meta_dir: default_meta_dir(),
        }
    }
}

impl OutputConfig {
    pub fn report_path(&self, file_name: &str) -> PathBuf {
        self.report_dir.join(file_name)
    }

    pub fn dataset_path(&self, file_name: &str) -> PathBuf {
        self.datasets_dir.join(file_name)
    }

    pub fn meta_path(&self, file_name: &str) -> PathBuf {
        self.meta_dir.join(file_name)
    }
}

// ── Dataset builder knobs ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Sample size assumed when none can be mined from the abstract.
    #[serde(default = "default_fallback_sample_size")]
    pub fallback_sample_size: u32,

    /// Minimum FAIR total for a study to count as compliant.
    #[serde(default = "default_fair_compliance")]
    pub fair_compliance_threshold: u32,
}

fn default_fallback_sample_size() -> u32 { 100 }
fn default_fair_compliance()      -> u32 { 50 }

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            fallback_sample_size: default_fallback_sample_size(),
            fair_compliance_threshold: default_fair_compliance(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl ReviewConfig {
    /// Parse a TOML config file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `SATREV_CONFIG` or `satrev.toml`.
    /// A missing file is not an error: the built-in defaults are used.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using built-in defaults");
            return Ok(Self::default());
        }

        info!(path = %path.display(), "Loading review configuration");
        Self::from_toml_file(&path)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(SatrevError::Config("at least one [[inputs]] entry is required".into()));
        }
        let mut labels: Vec<&str> = self.inputs.iter().map(|i| i.label.as_str()).collect();
        if labels.iter().any(|l| l.trim().is_empty()) {
            return Err(SatrevError::Config("input labels must not be empty".into()));
        }
        labels.sort_unstable();
        labels.dedup();
        if labels.len() != self.inputs.len() {
            return Err(SatrevError::Config("input labels must be unique".into()));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
