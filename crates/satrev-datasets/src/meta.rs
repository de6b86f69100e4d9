//! Meta-analysis inputs: reported accuracies mined from abstracts, pooled per
//! algorithm family with a random-effects model on the logit scale.
//!
//! Extraction is heuristic. Studies without a reported percentage accuracy
//! or a publication year are skipped; a missing sample size falls back to the
//! configured default so every kept study still gets a variance.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use satrev_common::{text::collapse_whitespace, Result, SatrevError};
use satrev_ingestion::FilteredEntry;
use serde::Serialize;
use tracing::{debug, info};

use crate::filter::{DomainFilter, StudyText};
use crate::output::write_csv;

pub const STUDIES_FILE: &str = "dados_meta_analise_sat.csv";
pub const POOLED_FILE: &str = "meta_analise_por_algoritmo_sat.csv";

const P_EPS: f64 = 1e-4;
const Z_95: f64 = 1.96;

// ── Extraction ────────────────────────────────────────────────────────────────

/// In priority order; the first pattern with any in-range match decides.
fn accuracy_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [
            r"(?i)overall\s+accuracy[^0-9%]{0,30}(\d{1,3}(?:\.\d+)?)\s*%",
            r"(?i)accuracy[^0-9%]{0,30}(\d{1,3}(?:\.\d+)?)\s*%",
            r"(?i)(\d{1,3}(?:\.\d+)?)\s*%\s*(?:overall\s*)?accuracy",
            r"(?i)achieves\s+(\d{1,3}(?:\.\d+)?)\s*%\s*accuracy",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn sample_size_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [
            r"(?i)\bn\s*=\s*(\d{2,7})\b",
            r"(?i)\b(\d{2,7})\s*(?:sampling\s+sites|samples|households|plots|observations|records)\b",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

const ALGORITHM_RULES: &[(&str, &str)] = &[
    (r"\b(transformer|bert|vit|vision transformer)\b", "Deep Learning"),
    (r"\b(cnn|convolutional neural network|deep learning|lstm|rnn|gru)\b", "Deep Learning"),
    (r"\b(artificial neural network|neural network|ann)\b", "Neural Network"),
    (r"\b(random forest|random forests)\b", "Random Forest"),
    (r"\b(svm|support vector machine|support vector machines)\b", "SVM"),
    (r"\b(xgboost|lightgbm|catboost)\b", "XGBoost"),
    (r"\b(gradient boosting|boosting)\b", "XGBoost"),
    (r"\b(pls-da|pls da|partial least squares discriminant)\b", "PLS-DA"),
    (r"\b(decision tree|cart)\b", "Decision Tree"),
    (r"\b(knn|k-nearest neighbor|k nearest neighbour)\b", "KNN"),
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

/// Highest percentage accuracy reported in `text`, if any.
pub fn extract_accuracy(text: &str) -> Option<f64> {
    let text = collapse_whitespace(text);
    for re in accuracy_patterns() {
        let best = re
            .captures_iter(&text)
            .filter_map(|c| c[1].parse::<f64>().ok())
            .filter(|v| (0.0..=100.0).contains(v))
            .reduce(f64::max);
        if best.is_some() {
            return best;
        }
    }
    None
}

/// Largest plausible sample size (10 to 10 million) reported in `text`.
pub fn extract_sample_size(text: &str) -> Option<u64> {
    let text = collapse_whitespace(text);
    sample_size_patterns()
        .iter()
        .flat_map(|re| re.captures_iter(&text).filter_map(|c| c[1].parse::<u64>().ok()))
        .filter(|v| (10..=10_000_000).contains(v))
        .max()
}

/// Algorithm family from lower-cased text.
pub fn infer_algorithm_family(text: &str) -> &'static str {
    algorithm_rules()
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, label)| *label)
        .unwrap_or("Other")
}

// ── Statistics ────────────────────────────────────────────────────────────────

fn clamp_p(p: f64) -> f64 {
    p.clamp(P_EPS, 1.0 - P_EPS)
}

fn logit(p: f64) -> f64 {
    let p = clamp_p(p);
    (p / (1.0 - p)).ln()
}

fn ilogit(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Variance of a percentage accuracy from the binomial standard error.
pub fn accuracy_variance(accuracy_pct: f64, n: u64) -> f64 {
    let p = clamp_p(accuracy_pct / 100.0);
    let se = (p * (1.0 - p) / n as f64).sqrt();
    (se * 100.0).powi(2)
}

fn restricted_nll(yi: &[f64], vi: &[f64], tau2: f64) -> f64 {
    let tau2 = tau2.max(0.0);
    let wi: Vec<f64> = vi.iter().map(|v| 1.0 / (v + tau2)).collect();
    let sw: f64 = wi.iter().sum();
    if !sw.is_finite() || sw <= 0.0 {
        return f64::INFINITY;
    }
    let mu = wi.iter().zip(yi).map(|(w, y)| w * y).sum::<f64>() / sw;
    let q: f64 = wi.iter().zip(yi).map(|(w, y)| w * (y - mu).powi(2)).sum();
    let log_det: f64 = vi.iter().map(|v| (v + tau2).ln()).sum();
    0.5 * (log_det + sw.ln() + q)
}

/// Between-study variance by restricted maximum likelihood.
///
/// The upper bracket starts at the larger of the effect variance and five
/// times the largest within-study variance, doubling up to 12 times while
/// the likelihood keeps improving; a golden-section search then narrows
/// `[0, hi]`.
pub fn reml_tau2(yi: &[f64], vi: &[f64]) -> f64 {
    if yi.is_empty() {
        return 0.0;
    }
    let nll = |tau2: f64| restricted_nll(yi, vi, tau2);

    let k = yi.len() as f64;
    let mean = yi.iter().sum::<f64>() / k;
    let var = yi.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / k;
    let max_vi = vi.iter().copied().filter(|v| !v.is_nan()).fold(f64::NEG_INFINITY, f64::max);
    let mut hi = var.max(1e-6).max(max_vi * 5.0);

    let f0 = nll(0.0);
    let mut fhi = nll(hi);
    let mut expand = 0;
    while fhi.is_finite() && fhi < f0 && expand < 12 {
        hi *= 2.0;
        fhi = nll(hi);
        expand += 1;
    }

    let gr = (5f64.sqrt() - 1.0) / 2.0;
    let mut lo = 0.0;
    let mut x1 = hi - gr * (hi - lo);
    let mut x2 = lo + gr * (hi - lo);
    let mut f1 = nll(x1);
    let mut f2 = nll(x2);
    for _ in 0..180 {
        if (hi - lo).abs() < 1e-10 {
            break;
        }
        if f1 > f2 {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + gr * (hi - lo);
            f2 = nll(x2);
        } else {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - gr * (hi - lo);
            f1 = nll(x1);
        }
    }
    ((lo + hi) / 2.0).max(0.0)
}

// ── Dataset ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaStudy {
    pub estudo_id: String,
    pub autor_ano: String,
    pub ano: i32,
    pub algoritmo: &'static str,
    pub acuracia: f64,
    pub n_amostral: u64,
    pub variancia: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PooledEstimate {
    pub algoritmo: &'static str,
    pub acuracia_pooled: f64,
    pub ic_inferior: f64,
    pub ic_superior: f64,
    pub n_estudos: usize,
}

/// Random-effects pooled accuracy of one group of studies.
pub fn pool(algorithm: &'static str, studies: &[&MetaStudy]) -> PooledEstimate {
    let (yi, vi): (Vec<f64>, Vec<f64>) = studies
        .iter()
        .map(|s| {
            let p = clamp_p(s.acuracia / 100.0);
            (logit(p), 1.0 / (s.n_amostral as f64 * p * (1.0 - p)))
        })
        .unzip();

    let tau2 = reml_tau2(&yi, &vi);
    let wi: Vec<f64> = vi.iter().map(|v| 1.0 / (v + tau2)).collect();
    let wsum: f64 = wi.iter().sum();
    let mu = wi.iter().zip(&yi).map(|(w, y)| w * y).sum::<f64>() / wsum;
    let se = (1.0 / wsum).sqrt();

    debug!(algorithm, k = studies.len(), tau2, "Pooled algorithm group");
    PooledEstimate {
        algoritmo: algorithm,
        acuracia_pooled: ilogit(mu) * 100.0,
        ic_inferior: ilogit(mu - Z_95 * se) * 100.0,
        ic_superior: ilogit(mu + Z_95 * se) * 100.0,
        n_estudos: studies.len(),
    }
}

#[derive(Debug, Clone)]
pub struct MetaDataset {
    /// Sorted by year, then algorithm.
    pub studies: Vec<MetaStudy>,
    /// Sorted by pooled accuracy, best first.
    pub pooled: Vec<PooledEstimate>,
}

impl MetaDataset {
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let min = self.studies.iter().map(|s| s.ano).min()?;
        let max = self.studies.iter().map(|s| s.ano).max()?;
        Some((min, max))
    }

    pub fn accuracy_mean(&self) -> f64 {
        let k = self.studies.len().max(1) as f64;
        self.studies.iter().map(|s| s.acuracia).sum::<f64>() / k
    }

    /// Sample standard deviation; 0 for fewer than two studies.
    pub fn accuracy_sd(&self) -> f64 {
        let k = self.studies.len();
        if k < 2 {
            return 0.0;
        }
        let mean = self.accuracy_mean();
        let ss: f64 = self.studies.iter().map(|s| (s.acuracia - mean).powi(2)).sum();
        (ss / (k - 1) as f64).sqrt()
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        write_csv(&dir.join(STUDIES_FILE), &self.studies)?;
        write_csv(&dir.join(POOLED_FILE), &self.pooled)
    }
}

/// Group studies by algorithm in order of first appearance and pool each group.
pub fn pool_by_algorithm(studies: &[MetaStudy]) -> Vec<PooledEstimate> {
    let mut groups: Vec<(&'static str, Vec<&MetaStudy>)> = Vec::new();
    for study in studies {
        match groups.iter_mut().find(|(algo, _)| *algo == study.algoritmo) {
            Some((_, members)) => members.push(study),
            None => groups.push((study.algoritmo, vec![study])),
        }
    }
    let mut pooled: Vec<PooledEstimate> = groups.iter().map(|(algo, members)| pool(*algo, members)).collect();
    pooled.sort_by(|a, b| b.acuracia_pooled.total_cmp(&a.acuracia_pooled));
    pooled
}

pub fn build_meta(entries: &[FilteredEntry], filter: &DomainFilter, fallback_sample_size: u64) -> Result<MetaDataset> {
    let mut studies: Vec<MetaStudy> = Vec::new();
    let mut without_accuracy = 0usize;
    let mut without_year = 0usize;

    for entry in entries {
        let study = StudyText::from_entry(entry);
        if !filter.qualifies(&study.blob()) {
            continue;
        }

        let findings = study.findings();
        let Some(accuracy) = extract_accuracy(&findings) else {
            without_accuracy += 1;
            continue;
        };
        let sample_text = [
            study.abstract_text.as_str(),
            &study.keywords,
            &study.author_keywords,
            &study.affiliations,
            &study.address,
        ]
        .join(" ");
        let n = extract_sample_size(&sample_text).unwrap_or(fallback_sample_size);
        let algorithm = infer_algorithm_family(&findings.to_lowercase());

        let Some(year) = study.year else {
            without_year += 1;
            continue;
        };

        let key = study.key.trim();
        let estudo_id = if key.is_empty() {
            format!("{}-{}", year, studies.len() + 1)
        } else {
            key.to_string()
        };
        let label = if key.is_empty() { "Study" } else { key };

        studies.push(MetaStudy {
            estudo_id,
            autor_ano: format!("{}_{}", label, year),
            ano: year,
            algoritmo: algorithm,
            acuracia: accuracy,
            n_amostral: n,
            variancia: accuracy_variance(accuracy, n),
        });
    }

    if studies.is_empty() {
        return Err(SatrevError::EmptyResult(
            "no accuracy could be extracted from the SAT corpus; check the filters and terms".into(),
        ));
    }

    studies.sort_by(|a, b| a.ano.cmp(&b.ano).then_with(|| a.algoritmo.cmp(b.algoritmo)));
    let pooled = pool_by_algorithm(&studies);

    info!(
        studies = studies.len(),
        algorithms = pooled.len(),
        without_accuracy,
        without_year,
        "Meta-analysis dataset built"
    );
    Ok(MetaDataset { studies, pooled })
}
