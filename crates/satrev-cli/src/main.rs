//! satrev - scoping review pipeline for machine learning in traditional
//! agricultural systems. Entry point for the `satrev` binary.

mod pipeline;

use anyhow::Context;
use satrev_common::ReviewConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("satrev=debug,info")),
        )
        .init();

    info!("satrev starting up");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = ReviewConfig::load().context("loading review configuration")?;
    info!(
        inputs = config.inputs.len(),
        report_dir = %config.output.report_dir.display(),
        "Configuration loaded"
    );

    let outcome = pipeline::run(&config)?;
    info!(
        records = outcome.records,
        duplicates = outcome.duplicates,
        relevant = outcome.relevant,
        filtered = outcome.filtered_entries,
        meta_studies = outcome.summary.meta_k,
        "Review pipeline finished"
    );
    Ok(())
}
