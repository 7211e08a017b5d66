//! Document-to-tables splitting stage.
//!
//! Scans every `*.txt` file under a directory, splits each into marker
//! sections, and re-serializes every well-formed section as a
//! comma-delimited table file named after the section.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use geoflow_shared::{GeoflowError, Result, commit_dir, part_path};

use crate::sections::scan_sections;
use crate::table::Table;

/// Counters for one splitting pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct SplitSummary {
    /// Text documents scanned.
    pub documents: usize,
    /// Table files written.
    pub tables_written: usize,
    /// Sections dropped (empty body or ragged rows).
    pub sections_skipped: usize,
}

/// Split every eligible document under `scan_dir` into per-section CSV
/// files in `out_dir`.
///
/// Documents are independent and sections within a document are
/// independent: a malformed section is logged and skipped without
/// affecting its siblings. Duplicate section names collapse
/// last-write-wins, both within a document and across documents.
#[instrument(skip_all, fields(scan = %scan_dir.display(), out = %out_dir.display()))]
pub fn split_tables(scan_dir: &Path, out_dir: &Path) -> Result<SplitSummary> {
    let tmp = part_path(out_dir);
    if tmp.exists() {
        std::fs::remove_dir_all(&tmp).map_err(|e| GeoflowError::io(&tmp, e))?;
    }
    std::fs::create_dir_all(&tmp).map_err(|e| GeoflowError::io(&tmp, e))?;

    let mut summary = SplitSummary::default();

    for entry in WalkDir::new(scan_dir)
        .into_iter()
        .filter_entry(|e| e.path() != out_dir && e.path() != tmp)
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file()
            || entry.path().extension().is_none_or(|ext| ext != "txt")
        {
            continue;
        }

        let content = match std::fs::read_to_string(entry.path()) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "skipping unreadable document");
                continue;
            }
        };
        summary.documents += 1;

        // Keyed by section name: a later section with the same name
        // replaces the earlier one before anything is serialized.
        let mut tables: BTreeMap<String, Table> = BTreeMap::new();
        for section in scan_sections(&content) {
            match Table::from_section(&section) {
                Ok(table) => {
                    tables.insert(section.name, table);
                }
                Err(e) => {
                    warn!(section = %section.name, error = %e, "skipping section");
                    summary.sections_skipped += 1;
                }
            }
        }

        for (name, table) in &tables {
            let file_name = format!("{}.csv", sanitize_name(name));
            table.write_csv(&tmp.join(&file_name))?;
            debug!(table = %file_name, rows = table.rows.len(), "table written");
            summary.tables_written += 1;
        }
    }

    commit_dir(&tmp, out_dir)?;
    info!(
        documents = summary.documents,
        tables = summary.tables_written,
        skipped = summary.sections_skipped,
        "documents split"
    );
    Ok(summary)
}

/// Section names become file names; keep them inside the output dir.
fn sanitize_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_doc(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn splits_document_into_csv_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "sample.txt", "[A]\nx\ty\n1\t2\n[B]\nm\tn\n3\t4\n5\t6\n");

        let out = dir.path().join("tables");
        let summary = split_tables(dir.path(), &out).unwrap();

        assert_eq!(summary.documents, 1);
        assert_eq!(summary.tables_written, 2);

        let a = Table::read_csv(&out.join("A.csv")).unwrap();
        assert_eq!(a.header, vec!["x", "y"]);
        assert_eq!(a.rows, vec![vec!["1", "2"]]);

        let b = Table::read_csv(&out.join("B.csv")).unwrap();
        assert_eq!(b.header, vec!["m", "n"]);
        assert_eq!(b.rows, vec![vec!["3", "4"], vec!["5", "6"]]);
    }

    #[test]
    fn no_marker_document_yields_no_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "flat.txt", "a\tb\n1\t2\n");

        let out = dir.path().join("tables");
        let summary = split_tables(dir.path(), &out).unwrap();

        assert_eq!(summary.documents, 1);
        assert_eq!(summary.tables_written, 0);
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn malformed_section_does_not_abort_siblings() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(
            dir.path(),
            "mixed.txt",
            "[Good]\na\tb\n1\t2\n[Ragged]\nx\ty\n1\t2\t3\n[AlsoGood]\nc\n9\n",
        );

        let out = dir.path().join("tables");
        let summary = split_tables(dir.path(), &out).unwrap();

        assert_eq!(summary.tables_written, 2);
        assert_eq!(summary.sections_skipped, 1);
        assert!(out.join("Good.csv").exists());
        assert!(out.join("AlsoGood.csv").exists());
        assert!(!out.join("Ragged.csv").exists());
    }

    #[test]
    fn duplicate_sections_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "dup.txt", "[A]\nx\nfirst\n[A]\nx\nsecond\n");

        let out = dir.path().join("tables");
        split_tables(dir.path(), &out).unwrap();

        let a = Table::read_csv(&out.join("A.csv")).unwrap();
        assert_eq!(a.rows, vec![vec!["second"]]);
    }

    #[test]
    fn empty_section_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "empty.txt", "[Empty]\n[Full]\na\n1\n");

        let out = dir.path().join("tables");
        let summary = split_tables(dir.path(), &out).unwrap();

        assert_eq!(summary.tables_written, 1);
        assert_eq!(summary.sections_skipped, 1);
        assert!(!out.join("Empty.csv").exists());
        assert!(out.join("Full.csv").exists());
    }

    #[test]
    fn non_txt_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "data.csv", "[A]\nx\n1\n");
        write_doc(dir.path(), "data.bin", "[A]\nx\n1\n");

        let out = dir.path().join("tables");
        let summary = split_tables(dir.path(), &out).unwrap();

        assert_eq!(summary.documents, 0);
        assert_eq!(summary.tables_written, 0);
    }

    #[test]
    fn scans_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("decompressed")).unwrap();
        write_doc(
            &dir.path().join("decompressed"),
            "deep.txt",
            "[Nested]\nk\tv\na\tb\n",
        );

        let out = dir.path().join("tables");
        let summary = split_tables(dir.path(), &out).unwrap();

        assert_eq!(summary.tables_written, 1);
        assert!(out.join("Nested.csv").exists());
    }
}
