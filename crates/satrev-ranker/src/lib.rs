//! satrev-ranker: Heuristic relevance classifier.
//! - Term tables, category weights and tier thresholds (YAML-loadable)
//! - Per-record scoring with exclusion precedence
//! - Corpus bucketing and the text/JSON/CSV/Markdown reports

pub mod report;
pub mod results;
pub mod scorer;
pub mod terms;
pub mod weights;

pub use results::ClassificationResults;
pub use scorer::{Classifier, MatchLocation, MatchedTerm, ScoredRecord, TermCategory, Tier};
pub use terms::ClassifierConfig;
pub use weights::{CategoryWeights, TierThresholds};
