//! satrev-common: Shared error type, review configuration, and text helpers
//! used across all satrev crates.

pub mod error;
pub mod review_config;
pub mod text;

// Re-export commonly used types
pub use error::{Result, SatrevError};
pub use review_config::{CorpusInput, OutputConfig, ReviewConfig};
