//! Headline numbers quoted in the manuscript, as `key=value` lines.

use std::fmt::Write;

use tracing::info;

use crate::fair::{DimensionScore, FairDataset};
use crate::mca::McaDataset;
use crate::meta::{MetaDataset, PooledEstimate};

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub bib_entries: usize,
    pub mca_rows: usize,
    pub mca_years: Option<(i32, i32)>,
    pub fair_dimensions: Vec<DimensionScore>,
    pub fair_indicators_total: usize,
    pub fair_indicators_n_pos: usize,
    pub fair_indicators_n_zero: usize,
    pub meta_k: usize,
    pub meta_years: Option<(i32, i32)>,
    pub meta_accuracy_mean: f64,
    pub meta_accuracy_sd: f64,
    /// Most studies first.
    pub meta_by_algorithm: Vec<PooledEstimate>,
}

impl DatasetSummary {
    pub fn new(bib_entries: usize, mca: &McaDataset, fair: &FairDataset, meta: &MetaDataset) -> Self {
        let indicators = fair.indicators();
        let n_pos = indicators.iter().filter(|i| i.n_sim > 0).count();

        let mut by_algorithm = meta.pooled.clone();
        by_algorithm.sort_by(|a, b| b.n_estudos.cmp(&a.n_estudos));

        Self {
            bib_entries,
            mca_rows: mca.rows.len(),
            mca_years: mca.year_range(),
            fair_dimensions: fair.dimension_scores(),
            fair_indicators_total: indicators.len(),
            fair_indicators_n_pos: n_pos,
            fair_indicators_n_zero: indicators.len() - n_pos,
            meta_k: meta.studies.len(),
            meta_years: meta.year_range(),
            meta_accuracy_mean: meta.accuracy_mean(),
            meta_accuracy_sd: meta.accuracy_sd(),
            meta_by_algorithm: by_algorithm,
        }
    }

    pub fn fair_total_score(&self) -> f64 {
        self.fair_dimensions.iter().map(|d| d.score_medio).sum()
    }

    pub fn fair_total_max(&self) -> u32 {
        self.fair_dimensions.iter().map(|d| d.score_max_possivel).sum()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "bib_entries={}", self.bib_entries);

        let _ = writeln!(out, "mca_rows={}", self.mca_rows);
        if let Some((min, max)) = self.mca_years {
            let _ = writeln!(out, "mca_year_min={} mca_year_max={}", min, max);
        }

        let total = self.fair_total_score();
        let total_max = self.fair_total_max();
        let total_pct = if total_max > 0 { 100.0 * total / total_max as f64 } else { 0.0 };
        let _ = writeln!(
            out,
            "fair_total_score={:.3} fair_total_max={} fair_total_pct={:.3}",
            total, total_max, total_pct
        );
        for dim in &self.fair_dimensions {
            let _ = writeln!(
                out,
                "fair_{}_score={:.3} max={} pct={:.3}",
                dim.dimensao, dim.score_medio, dim.score_max_possivel, dim.percentual
            );
        }
        let _ = writeln!(
            out,
            "fair_indicators_total={} fair_indicators_n_pos={} fair_indicators_n_zero={}",
            self.fair_indicators_total, self.fair_indicators_n_pos, self.fair_indicators_n_zero
        );

        let _ = writeln!(out, "meta_k={}", self.meta_k);
        if let Some((min, max)) = self.meta_years {
            let _ = writeln!(out, "meta_year_min={} meta_year_max={}", min, max);
        }
        let _ = writeln!(
            out,
            "meta_accuracy_mean={:.3} meta_accuracy_sd={:.3}",
            self.meta_accuracy_mean, self.meta_accuracy_sd
        );
        let _ = writeln!(out, "meta_by_algorithm");
        for est in &self.meta_by_algorithm {
            let _ = writeln!(
                out,
                "- {}: pooled={:.3} CI=[{:.3}, {:.3}] n={}",
                est.algoritmo, est.acuracia_pooled, est.ic_inferior, est.ic_superior, est.n_estudos
            );
        }
        out
    }

    pub fn log(&self) {
        for line in self.render().lines() {
            info!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fair::FairAssessment;
    use crate::filter::StudyText;
    use crate::mca::{McaExclusions, McaRow};
    use crate::meta::{accuracy_variance, pool_by_algorithm, MetaStudy};

    fn mca() -> McaDataset {
        let row = |id, year| McaRow {
            id,
            year,
            period: crate::mca::infer_period(year),
            algorithm: "Other",
            evidence: "Other",
            context: "Swidden",
            application: "Other",
            region: "Global",
        };
        McaDataset { rows: vec![row(1, 2012), row(3, 2023)], excluded: McaExclusions::default() }
    }

    fn fair() -> FairDataset {
        let study = StudyText {
            key: "S".into(),
            year: Some(2020),
            title: "Swidden".into(),
            doi: "10.1/x".into(),
            ..Default::default()
        };
        FairDataset { studies: vec![FairAssessment::assess(&study)], compliance_threshold: 50 }
    }

    fn meta() -> MetaDataset {
        let study = |id: &str, year, algo, acc: f64| MetaStudy {
            estudo_id: id.into(),
            autor_ano: format!("{id}_{year}"),
            ano: year,
            algoritmo: algo,
            acuracia: acc,
            n_amostral: 100,
            variancia: accuracy_variance(acc, 100),
        };
        let studies = vec![
            study("a", 2018, "SVM", 80.0),
            study("b", 2019, "Random Forest", 90.0),
            study("c", 2020, "Random Forest", 90.0),
        ];
        let pooled = pool_by_algorithm(&studies);
        MetaDataset { studies, pooled }
    }

    #[test]
    fn test_render_lines() {
        let summary = DatasetSummary::new(7, &mca(), &fair(), &meta());
        let text = summary.render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "bib_entries=7");
        assert_eq!(lines[1], "mca_rows=2");
        assert_eq!(lines[2], "mca_year_min=2012 mca_year_max=2023");
        assert_eq!(lines[3], "fair_total_score=10.000 fair_total_max=100 fair_total_pct=10.000");
        assert_eq!(lines[4], "fair_Findable_score=10.000 max=25 pct=40.000");
        assert_eq!(lines[8], "fair_indicators_total=11 fair_indicators_n_pos=1 fair_indicators_n_zero=10");
        assert_eq!(lines[9], "meta_k=3");
        assert_eq!(lines[10], "meta_year_min=2018 meta_year_max=2020");
        assert_eq!(lines[11], "meta_accuracy_mean=86.667 meta_accuracy_sd=5.774");
        assert_eq!(lines[12], "meta_by_algorithm");
        assert!(lines[13].starts_with("- Random Forest: pooled=90.000 CI=["));
        assert!(lines[13].ends_with("n=2"));
        assert!(lines[14].starts_with("- SVM: pooled=80.000"));
    }
}
