//! Extraction, merge and classification over export-shaped fixtures.

use satrev_ingestion::{dedup::merge_sources, load_filtered_bibtex, parse_bibtex, write_filtered_bibtex};
use satrev_ranker::{report, ClassificationResults, Classifier, Tier};
use satrev_test_utils::pretty_assertions::assert_eq;
use satrev_test_utils::{scopus_sample, wos_sample, BibEntryBuilder, render_export};

fn tier_of(results: &ClassificationResults, key: &str) -> Option<Tier> {
    results.all_records().find(|s| s.record.key == key).map(|s| s.tier)
}

#[test]
fn two_entry_export_is_split_by_relevance() {
    let text = render_export(&[
        BibEntryBuilder::article("A")
            .title("Traditional agricultural system using random forest classification")
            .year("2022"),
        BibEntryBuilder::article("B")
            .title("machine learning for urban traffic prediction")
            .year("2022"),
    ]);
    let corpus = parse_bibtex(&text, "Scopus");
    let results = ClassificationResults::from_corpus(&corpus, &Classifier::default());

    let a = tier_of(&results, "A_Scopus").unwrap();
    assert!(matches!(a, Tier::High | Tier::Excellence), "got {a:?}");
    assert_eq!(tier_of(&results, "B_Scopus"), Some(Tier::Low));
}

#[test]
fn merged_samples_land_in_expected_tiers() {
    let scopus = parse_bibtex(&scopus_sample(), "Scopus");
    let wos = parse_bibtex(&wos_sample(), "WoS");
    let merged = merge_sources(vec![("Scopus".to_string(), scopus), ("WoS".to_string(), wos)]);

    assert_eq!(merged.corpus.len(), 5);
    assert_eq!(merged.duplicates.len(), 1);
    assert_eq!(merged.duplicates[0].primary_key, "Silva2021_Scopus");

    let results = ClassificationResults::from_corpus(&merged.corpus, &Classifier::default());
    assert_eq!(tier_of(&results, "Silva2021_Scopus"), Some(Tier::Excellence));
    assert_eq!(tier_of(&results, "Lima2018_Scopus"), Some(Tier::High));
    assert_eq!(tier_of(&results, "WOS:000222_WoS"), Some(Tier::Adequate));
    assert_eq!(tier_of(&results, "Costa2020_Scopus"), Some(Tier::Low));
    assert_eq!(tier_of(&results, "Review2019_Scopus"), Some(Tier::Excluded));
    assert_eq!(results.relevant(), 3);
}

#[test]
fn filtered_bibliography_feeds_markdown_reports() {
    let corpus = parse_bibtex(&scopus_sample(), "Scopus");
    let classifier = Classifier::default();
    let results = ClassificationResults::from_corpus(&corpus, &classifier);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filtered.bib");
    write_filtered_bibtex(&path, &["header".to_string()], &results.bib_sections()).unwrap();

    let entries = load_filtered_bibtex(&path);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].record.citation_key, "Silva2021");
    assert_eq!(entries[0].source, "Scopus");
    assert_eq!(entries[0].score, 15.5);

    let thresholds = classifier.config().thresholds;
    let excellence = report::render_excellence_markdown(&entries, thresholds.excellence);
    assert!(excellence.contains("### 1. Mapping shifting cultivation"));
    assert!(excellence.contains("[10.1016/j.rse.2021.112233](https://doi.org/10.1016/j.rse.2021.112233)"));

    let high = report::render_high_relevance_markdown(&entries, thresholds.high, thresholds.excellence);
    assert!(high.contains("## 1. Agroforestry yield estimation using deep learning"));
}
