//! In-memory table model and pure transforms.

use std::path::Path;

use geoflow_shared::{GeoflowError, Result};

use crate::sections::Section;

/// Header plus rows derived from one section.
///
/// Invariant: every row has exactly `header.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Interpret a section body as a tab-separated grid.
    ///
    /// The first non-blank line is the header; every following non-blank
    /// line is one row. A row whose cell count differs from the header is
    /// a parse error for this table only.
    pub fn from_section(section: &Section) -> Result<Self> {
        let mut lines = section.lines.iter().filter(|l| !l.trim().is_empty());

        let header: Vec<String> = match lines.next() {
            Some(line) => split_cells(line),
            None => {
                return Err(GeoflowError::parse(format!(
                    "section '{}' has no body lines",
                    section.name
                )));
            }
        };

        let mut rows = Vec::new();
        for (i, line) in lines.enumerate() {
            let cells = split_cells(line);
            if cells.len() != header.len() {
                return Err(GeoflowError::parse(format!(
                    "section '{}' row {} has {} cells, header has {}",
                    section.name,
                    i + 1,
                    cells.len(),
                    header.len()
                )));
            }
            rows.push(cells);
        }

        Ok(Self { header, rows })
    }

    /// Read a comma-delimited table file back into memory.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| GeoflowError::parse(format!("{}: {e}", path.display())))?;

        let header: Vec<String> = reader
            .headers()
            .map_err(|e| GeoflowError::parse(format!("{}: {e}", path.display())))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| GeoflowError::parse(format!("{}: {e}", path.display())))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { header, rows })
    }

    /// Write the table as a comma-delimited file with a header row.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| GeoflowError::parse(format!("{}: {e}", path.display())))?;

        writer
            .write_record(&self.header)
            .map_err(|e| GeoflowError::parse(format!("{}: {e}", path.display())))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| GeoflowError::parse(format!("{}: {e}", path.display())))?;
        }
        writer
            .flush()
            .map_err(|e| GeoflowError::io(path, e))?;
        Ok(())
    }
}

fn split_cells(line: &str) -> Vec<String> {
    line.split('\t').map(str::to_string).collect()
}

/// Drop the named columns from a table, preserving the order of the rest.
///
/// Names in `remove` that are absent from the header are silently
/// ignored. Pure: the input table is untouched.
pub fn project(table: &Table, remove: &[&str]) -> Table {
    let keep: Vec<usize> = table
        .header
        .iter()
        .enumerate()
        .filter(|(_, name)| !remove.contains(&name.as_str()))
        .map(|(i, _)| i)
        .collect();

    Table {
        header: keep.iter().map(|&i| table.header[i].clone()).collect(),
        rows: table
            .rows
            .iter()
            .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
            .collect(),
    }
}
