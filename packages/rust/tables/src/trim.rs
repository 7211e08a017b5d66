//! Probe-table schema projection stage.

use std::path::Path;

use tracing::{info, instrument, warn};

use geoflow_shared::{GeoflowError, Result, commit_dir, part_path};

use crate::table::{Table, project};

/// Only tables of this kind are projected; everything else stays in the
/// tables directory untouched.
pub const PROBE_TABLE_SUFFIX: &str = "Probes.csv";

/// Bulky annotation columns dropped from probe tables, when present.
pub const PROBE_COLUMNS_TO_REMOVE: [&str; 7] = [
    "Definition",
    "Ontology_Component",
    "Ontology_Process",
    "Ontology_Function",
    "Synonyms",
    "Obsolete_Probe_Id",
    "Probe_Sequence",
];

/// Write trimmed copies of every probe table in `tables_dir` to `out_dir`.
///
/// Files that cannot be read back as tables are logged and skipped —
/// there is nothing to project. Returns the number of trimmed copies
/// written; zero matching files is not an error.
#[instrument(skip_all, fields(tables = %tables_dir.display(), out = %out_dir.display()))]
pub fn trim_tables(tables_dir: &Path, out_dir: &Path) -> Result<usize> {
    let tmp = part_path(out_dir);
    if tmp.exists() {
        std::fs::remove_dir_all(&tmp).map_err(|e| GeoflowError::io(&tmp, e))?;
    }
    std::fs::create_dir_all(&tmp).map_err(|e| GeoflowError::io(&tmp, e))?;

    let entries = std::fs::read_dir(tables_dir).map_err(|e| GeoflowError::io(tables_dir, e))?;
    let mut written = 0usize;

    for entry in entries.filter_map(|e| e.ok()) {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !name.ends_with(PROBE_TABLE_SUFFIX) {
            continue;
        }

        let table = match Table::read_csv(&entry.path()) {
            Ok(t) => t,
            Err(e) => {
                warn!(file = %name, error = %e, "skipping unreadable probe table");
                continue;
            }
        };

        let trimmed = project(&table, &PROBE_COLUMNS_TO_REMOVE);
        trimmed.write_csv(&tmp.join(&name))?;
        written += 1;
    }

    commit_dir(&tmp, out_dir)?;
    info!(written, "probe tables trimmed");
    Ok(written)
}
