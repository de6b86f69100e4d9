//! Derived datasets built from the filtered bibliography: FAIR proxy
//! scores, the MCA categorical table, meta-analysis inputs, bibliometric
//! frequencies and the manuscript summary.

pub mod bibliometrics;
pub mod fair;
pub mod filter;
pub mod mca;
pub mod meta;
pub mod output;
pub mod summary;

pub use bibliometrics::BibliometricSummary;
pub use fair::{build_fair, FairAssessment, FairDataset};
pub use filter::{DomainFilter, StudyText};
pub use mca::{build_mca, McaDataset, McaRow};
pub use meta::{build_meta, reml_tau2, MetaDataset, MetaStudy, PooledEstimate};
pub use output::write_csv;
pub use summary::DatasetSummary;
