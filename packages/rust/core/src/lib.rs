//! Pipeline orchestration for Geoflow.
//!
//! Wires the fetch/extract/decompress/split/trim stages into a single
//! resumable chain with skip-if-exists memoization.

pub mod pipeline;
pub mod stage;

pub use pipeline::{PipelineConfig, PipelineReport, run_pipeline};
pub use stage::{SilentProgress, Stage, StageProgress, StageRun, execute_chain};
