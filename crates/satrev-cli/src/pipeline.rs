//! End-to-end review run: ingest, classify, write reports, build datasets.

use anyhow::{Context, Result};
use satrev_common::{text::write_text, ReviewConfig, SatrevError};
use satrev_datasets::{build_fair, build_mca, build_meta, BibliometricSummary, DatasetSummary, DomainFilter};
use satrev_ingestion::{
    load_bibtex_file, merge_sources, parse_filtered_bibtex, render_filtered_bibtex, writer::DEFAULT_HEADER,
    MergeOutcome,
};
use satrev_ranker::{report, ClassificationResults, Classifier, ClassifierConfig};
use tracing::info;

pub const TEXT_REPORT_FILE: &str = "relatorio_analise_scopus_wos.txt";
pub const JSON_SUMMARY_FILE: &str = "classificacao_resumo.json";
pub const CLASSIFIED_CSV_FILE: &str = "classificacao_registros.csv";
pub const HIGH_RELEVANCE_FILE: &str = "1-lista_alta_relevancia.md";
pub const BIBLIOMETRICS_FILE: &str = "2-analise_bibliometrica.md";
pub const EXCELLENCE_FILE: &str = "3-analise_excelencia.md";

/// Headline counts of one run.
#[derive(Debug)]
pub struct RunOutcome {
    pub records: usize,
    pub duplicates: usize,
    pub relevant: usize,
    pub filtered_entries: usize,
    pub summary: DatasetSummary,
}

/// Run the whole review. Every output is rendered and every dataset built
/// before the first file is written, so a failing run leaves no outputs.
pub fn run(config: &ReviewConfig) -> Result<RunOutcome> {
    let merged = ingest(config)?;
    let classifier = load_classifier(config)?;
    let thresholds = classifier.config().thresholds;

    let results = ClassificationResults::from_corpus(&merged.corpus, &classifier);
    if results.relevant() == 0 {
        return Err(SatrevError::EmptyResult(format!(
            "no qualifying records among {} classified, check filter terms",
            merged.corpus.len()
        ))
        .into());
    }

    // ── Render ────────────────────────────────────────────────────────────
    let text_report = report::render_text_report(&results, classifier.config());
    let summary = report::render_summary(&results, classifier.config());
    let json = serde_json::to_string_pretty(&summary).context("serializing classification summary")?;

    let header = filtered_header(&merged, results.relevant());
    let filtered_bib = render_filtered_bibtex(&header, &results.bib_sections());
    let entries = parse_filtered_bibtex(&filtered_bib);

    let high_relevance = report::render_high_relevance_markdown(&entries, thresholds.high, thresholds.excellence);
    let bibliometrics = BibliometricSummary::from_entries(&entries).render_markdown();
    let excellence = report::render_excellence_markdown(&entries, thresholds.excellence);

    let filter = DomainFilter::default();
    let fair = build_fair(&entries, &filter, config.datasets.fair_compliance_threshold)
        .context("building FAIR dataset")?;
    let mca = build_mca(&entries, &filter).context("building MCA dataset")?;
    let meta = build_meta(&entries, &filter, u64::from(config.datasets.fallback_sample_size))
        .context("building meta-analysis dataset")?;

    // ── Write ─────────────────────────────────────────────────────────────
    let out = &config.output;
    write_text(&out.report_path(TEXT_REPORT_FILE), &text_report).context("writing text report")?;
    write_text(&out.report_path(JSON_SUMMARY_FILE), &json).context("writing JSON summary")?;
    report::write_classified_csv(&results, &out.report_path(CLASSIFIED_CSV_FILE))
        .context("writing classified records CSV")?;

    write_text(&out.filtered_bib, &filtered_bib).context("writing filtered bibliography")?;
    info!(path = %out.filtered_bib.display(), entries = entries.len(), "Filtered bibliography written");

    write_text(&out.report_path(HIGH_RELEVANCE_FILE), &high_relevance).context("writing high-relevance list")?;
    write_text(&out.report_path(BIBLIOMETRICS_FILE), &bibliometrics).context("writing bibliometric analysis")?;
    write_text(&out.report_path(EXCELLENCE_FILE), &excellence).context("writing excellence analysis")?;

    fair.write(&out.datasets_dir).context("writing FAIR tables")?;
    mca.write(&out.datasets_dir).context("writing MCA table")?;
    meta.write(&out.meta_dir).context("writing meta-analysis tables")?;

    let dataset_summary = DatasetSummary::new(entries.len(), &mca, &fair, &meta);
    dataset_summary.log();

    Ok(RunOutcome {
        records: merged.corpus.len(),
        duplicates: merged.duplicates.len(),
        relevant: results.relevant(),
        filtered_entries: entries.len(),
        summary: dataset_summary,
    })
}

/// Load every configured export and merge them in priority order.
fn ingest(config: &ReviewConfig) -> Result<MergeOutcome> {
    let corpora: Vec<(String, _)> = config
        .inputs
        .iter()
        .map(|input| (input.label.clone(), load_bibtex_file(&input.path, &input.label)))
        .collect();

    if corpora.iter().all(|(_, corpus)| corpus.is_empty()) {
        let paths: Vec<String> = config.inputs.iter().map(|i| i.path.display().to_string()).collect();
        return Err(SatrevError::NoInput(format!("no records in {}", paths.join(", "))).into());
    }

    let merged = merge_sources(corpora);
    info!(
        records = merged.corpus.len(),
        duplicates = merged.duplicates.len(),
        "Corpus merged"
    );
    Ok(merged)
}

fn load_classifier(config: &ReviewConfig) -> Result<Classifier> {
    let classifier_config = match &config.classifier_config {
        Some(path) => ClassifierConfig::from_yaml_file(path)
            .with_context(|| format!("loading classifier terms from {}", path.display()))?,
        None => ClassifierConfig::default(),
    };
    classifier_config.validate().context("validating classifier configuration")?;
    Ok(Classifier::new(classifier_config))
}

fn filtered_header(merged: &MergeOutcome, relevant: usize) -> Vec<String> {
    let sources: Vec<String> = merged
        .kept_per_source
        .iter()
        .map(|(label, kept)| format!("{label} ({kept})"))
        .collect();
    DEFAULT_HEADER
        .iter()
        .map(|line| line.to_string())
        .chain([
            format!("Sources: {}", sources.join(", ")),
            format!("Relevant records: {relevant}"),
        ])
        .collect()
}
