//! CSV table output.

use std::path::Path;

use satrev_common::{text::create_parent_dirs, Result};
use serde::Serialize;
use tracing::info;

/// Serialize `rows` with a header line taken from the row type's field names.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    create_parent_dirs(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "Dataset table written");
    Ok(())
}

/// `Sim`/`Não` as read by the plotting scripts.
pub fn sim_nao(flag: bool) -> &'static str {
    if flag { "Sim" } else { "Não" }
}
