//! Classifier configuration: term tables, weights and thresholds.
//!
//! The defaults are the review protocol's curated lists. An alternate table
//! can be loaded from YAML; omitted keys fall back to the defaults.

use std::path::Path;

use satrev_common::{Result, SatrevError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::weights::{CategoryWeights, TierThresholds};

pub const DEFAULT_PRIORITY_TERMS: &[&str] = &[
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
];

pub const DEFAULT_HIGH_TERMS: &[&str] = &[
    "machine learning",
    "artificial intelligence",
    "deep learning",
    "random forest",
    "neural network",
    "support vector machine",
    "svm",
    "classification model",
    "predictive model",
    "ensemble learning",
    "decision tree",
    "data mining",
    "supervised learning",
    "unsupervised learning",
    "gradient boosting",
    "naive bayes",
    "k-nearest neighbor",
    "knn",
    "convolutional neural network",
    "cnn",
    "artificial neural network",
    "ann",
    "explainable ai",
    "explainable artificial intelligence",
    "xai",
    "model interpretability",
    "feature importance",
];

pub const DEFAULT_ADEQUATE_TERMS: &[&str] = &[
    "modeling",
    "modelling",
    "spatial analysis",
    "remote sensing",
    "gis",
    "geographic information system",
];

pub const DEFAULT_EXCLUSION_TERMS: &[&str] = &[
    "review",
    "systematic review",
    "meta-analysis",
    "book chapter",
    "conference",
    "editorial",
];

fn to_owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

fn default_priority_terms()  -> Vec<String> { to_owned(DEFAULT_PRIORITY_TERMS) }
fn default_high_terms()      -> Vec<String> { to_owned(DEFAULT_HIGH_TERMS) }
fn default_adequate_terms()  -> Vec<String> { to_owned(DEFAULT_ADEQUATE_TERMS) }
fn default_exclusion_terms() -> Vec<String> { to_owned(DEFAULT_EXCLUSION_TERMS) }

/// Immutable input of the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_priority_terms")]
    pub priority_terms: Vec<String>,

    #[serde(default = "default_high_terms")]
    pub high_terms: Vec<String>,

    #[serde(default = "default_adequate_terms")]
    pub adequate_terms: Vec<String>,

    #[serde(default = "default_exclusion_terms")]
    pub exclusion_terms: Vec<String>,

    #[serde(default)]
    pub weights: CategoryWeights,

    #[serde(default)]
    pub thresholds: TierThresholds,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            priority_terms: default_priority_terms(),
            high_terms: default_high_terms(),
            adequate_terms: default_adequate_terms(),
            exclusion_terms: default_exclusion_terms(),
            weights: CategoryWeights::default(),
            thresholds: TierThresholds::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        if self.priority_terms.iter().all(|t| t.trim().is_empty()) {
            return Err(SatrevError::Config("priority_terms must not be empty".into()));
        }
        if !self.weights.validate() {
            return Err(SatrevError::Config(format!(
                "category weights must be finite and non-negative: {:?}",
                self.weights
            )));
        }
        if !self.thresholds.validate() {
            return Err(SatrevError::Config(format!(
                "tier thresholds must be strictly descending: {:?}",
                self.thresholds
            )));
        }
        Ok(())
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        info!(
            path = %path.display(),
            priority = config.priority_terms.len(),
            high = config.high_terms.len(),
            adequate = config.adequate_terms.len(),
            exclusion = config.exclusion_terms.len(),
            "Loaded classifier term tables"
        );
        Ok(config)
    }

    /// Write the term tables as YAML, e.g. to seed an editable copy of the defaults.
    pub fn to_yaml_file(&self, path: &Path) -> Result<()> {
        satrev_common::text::write_text(path, &self.to_yaml()?)?;
        info!(path = %path.display(), "Wrote classifier term tables");
        Ok(())
    }
}
