//! Section scanning, table parsing, and schema projection for Geoflow.
//!
//! The core of the pipeline: turns bracket-sectioned tab-separated text
//! documents into independent comma-delimited table files, and trims a
//! fixed column set from probe tables.

pub mod sections;
pub mod split;
pub mod table;
pub mod trim;

pub use sections::{Section, scan_sections};
pub use split::{SplitSummary, split_tables};
pub use table::{Table, project};
pub use trim::{PROBE_COLUMNS_TO_REMOVE, PROBE_TABLE_SUFFIX, trim_tables};
