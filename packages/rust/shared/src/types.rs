//! Domain types for Geoflow.

use std::path::{Path, PathBuf};

/// A dataset identifier plus base directory.
///
/// Every stage's input and output path is a pure function of this pair;
/// there is no separate metadata store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLocation {
    /// GEO series accession, e.g. `GSE12345`.
    pub dataset: String,
    /// Root directory under which all datasets live.
    pub base_dir: PathBuf,
}

impl DatasetLocation {
    pub fn new(dataset: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            dataset: dataset.into(),
            base_dir: base_dir.into(),
        }
    }

    /// Fetched archive: `<base>/<id>.tar` — a sibling of the dataset dir.
    pub fn archive_path(&self) -> PathBuf {
        self.base_dir.join(format!("{}.tar", self.dataset))
    }

    /// Extracted archive contents: `<base>/<id>/`.
    pub fn dataset_dir(&self) -> PathBuf {
        self.base_dir.join(&self.dataset)
    }

    /// Decompressed members: `<base>/<id>/decompressed/`.
    pub fn decompressed_dir(&self) -> PathBuf {
        self.dataset_dir().join("decompressed")
    }

    /// Parsed per-section tables: `<base>/<id>/tables/`.
    pub fn tables_dir(&self) -> PathBuf {
        self.dataset_dir().join("tables")
    }

    /// Schema-projected probe tables: `<base>/<id>/trimmed/`.
    pub fn trimmed_dir(&self) -> PathBuf {
        self.dataset_dir().join("trimmed")
    }
}

/// Temporary sibling path used while a stage output is being built.
///
/// The `.part` suffix keeps half-written outputs invisible to the
/// orchestrator's existence check; a finished output is committed with a
/// single rename.
pub fn part_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    target.with_file_name(name)
}

/// Commit a fully-built `.part` directory to its final name.
///
/// A stale target from an earlier run is removed first; the rename
/// itself is the atomic step, so the existence check only ever sees the
/// finished directory.
pub fn commit_dir(tmp: &Path, target: &Path) -> crate::error::Result<()> {
    use crate::error::GeoflowError;

    if target.exists() {
        std::fs::remove_dir_all(target).map_err(|e| GeoflowError::io(target, e))?;
    }
    std::fs::rename(tmp, target).map_err(|e| GeoflowError::io(target, e))
}
