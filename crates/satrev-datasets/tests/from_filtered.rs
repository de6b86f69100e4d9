//! Dataset builders over a filtered bibliography produced by the classifier.

use satrev_datasets::{build_fair, build_mca, build_meta, BibliometricSummary, DatasetSummary, DomainFilter};
use satrev_ingestion::{dedup::merge_sources, load_filtered_bibtex, parse_bibtex, write_filtered_bibtex, FilteredEntry};
use satrev_ranker::{ClassificationResults, Classifier};
use satrev_test_utils::pretty_assertions::assert_eq;
use satrev_test_utils::{scopus_sample, wos_sample};

fn filtered_entries(dir: &std::path::Path) -> Vec<FilteredEntry> {
    let merged = merge_sources(vec![
        ("Scopus".to_string(), parse_bibtex(&scopus_sample(), "Scopus")),
        ("WoS".to_string(), parse_bibtex(&wos_sample(), "WoS")),
    ]);
    let results = ClassificationResults::from_corpus(&merged.corpus, &Classifier::default());
    let path = dir.join("filtered.bib");
    write_filtered_bibtex(&path, &[], &results.bib_sections()).unwrap();
    load_filtered_bibtex(&path)
}

#[test]
fn builders_share_the_filtered_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let entries = filtered_entries(dir.path());
    let keys: Vec<&str> = entries.iter().map(|e| e.record.citation_key.as_str()).collect();
    assert_eq!(keys, vec!["Silva2021", "Lima2018", "WOS:000222"]);

    let filter = DomainFilter::default();

    let mca = build_mca(&entries, &filter).unwrap();
    let labels: Vec<(usize, &str, &str)> = mca.rows.iter().map(|r| (r.id, r.algorithm, r.region)).collect();
    assert_eq!(
        labels,
        vec![(1, "RandomForest", "Americas"), (2, "DeepLearning", "Americas"), (3, "Other", "Asia")]
    );
    assert_eq!(mca.rows[2].application, "Biodiversity");

    let meta = build_meta(&entries, &filter, 100).unwrap();
    let studies: Vec<(&str, f64, u64)> =
        meta.studies.iter().map(|s| (s.estudo_id.as_str(), s.acuracia, s.n_amostral)).collect();
    assert_eq!(studies, vec![("Lima2018", 84.0, 100), ("Silva2021", 91.5, 240)]);
    assert_eq!(meta.pooled.len(), 2);
    assert_eq!(meta.pooled[0].algoritmo, "Random Forest");

    let fair = build_fair(&entries, &filter, 50).unwrap();
    assert_eq!(fair.studies.len(), 3);
    assert!(fair.studies[0].doi_available);
    assert!(!fair.studies[2].doi_available);

    let biblio = BibliometricSummary::from_entries(&entries);
    assert_eq!(biblio.articles, 3);
    assert!(biblio.countries.iter().any(|(c, n)| c == "Peru" && *n == 1));

    let summary = DatasetSummary::new(entries.len(), &mca, &fair, &meta);
    let text = summary.render();
    assert!(text.starts_with("bib_entries=3\nmca_rows=3\nmca_year_min=2016 mca_year_max=2021\n"));
    assert!(text.contains("meta_k=2\n"));
}

#[test]
fn written_tables_have_expected_headers() {
    let dir = tempfile::tempdir().unwrap();
    let entries = filtered_entries(dir.path());
    let filter = DomainFilter::default();
    let out = dir.path().join("datasets");

    build_fair(&entries, &filter, 50).unwrap().write(&out).unwrap();
    build_mca(&entries, &filter).unwrap().write(&out).unwrap();
    build_meta(&entries, &filter, 100).unwrap().write(&out).unwrap();

    let header = |name: &str| {
        std::fs::read_to_string(out.join(name))
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .to_string()
    };
    assert_eq!(header("indicadores_fair_detalhados_sat.csv"), "indicador,n_sim,percentual,gap,indicador_en");
    assert!(header("fair_estudos_sat.csv").starts_with("estudo_id,ano,doi_disponivel,metadados_ricos,"));
    assert_eq!(header("mca_dados_categorizados_sat.csv"), "ID,Ano,Periodo,Algoritmo,Evidencia,Contexto,Aplicacao,Regiao");
    assert_eq!(
        header("dados_meta_analise_sat.csv"),
        "estudo_id,autor_ano,ano,algoritmo,acuracia,n_amostral,variancia"
    );
    assert_eq!(
        header("meta_analise_por_algoritmo_sat.csv"),
        "algoritmo,acuracia_pooled,ic_inferior,ic_superior,n_estudos"
    );
}
