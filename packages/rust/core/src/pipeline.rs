//! End-to-end dataset pipeline: fetch → extract → decompress → split → trim.
//!
//! A linear chain of five stages, each reading only what the previous
//! stage left on disk. The orchestrator in [`crate::stage`] skips stages
//! whose outputs already exist, which makes the whole pipeline
//! idempotent and resumable by construction.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{info, instrument};
use url::Url;

use geoflow_archive::{decompress_members, extract_tar};
use geoflow_fetch::{Client, archive_url, build_client, fetch_archive};
use geoflow_shared::{DatasetLocation, Result};
use geoflow_tables::{split_tables, trim_tables};

use crate::stage::{Stage, StageProgress, execute_chain};

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Dataset accession and base directory.
    pub location: DatasetLocation,
    /// Base URL of the GEO mirror.
    pub mirror_base: Url,
    /// Concurrent workers for member decompression.
    pub concurrency: usize,
}

/// Result of a completed pipeline run.
#[derive(Debug)]
pub struct PipelineReport {
    /// Stages whose run operation was invoked, in order.
    pub executed: Vec<&'static str>,
    /// Stages skipped because their outputs already existed.
    pub skipped: Vec<&'static str>,
    /// Final output directory with the trimmed probe tables.
    pub trimmed_dir: PathBuf,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Run the full pipeline for one dataset.
///
/// Any stage failure aborts the chain and reports the stage name plus
/// the underlying cause; completed stage outputs are left on disk for
/// inspection and reuse on retry.
#[instrument(skip_all, fields(dataset = %config.location.dataset))]
pub async fn run_pipeline(
    config: &PipelineConfig,
    progress: &dyn StageProgress,
) -> Result<PipelineReport> {
    let start = Instant::now();
    let loc = &config.location;

    let client = build_client()?;
    let url = archive_url(&config.mirror_base, &loc.dataset)?;

    let stages: Vec<Box<dyn Stage>> = vec![
        Box::new(FetchStage {
            client,
            url,
            dest: loc.archive_path(),
        }),
        Box::new(ExtractStage {
            tar_path: loc.archive_path(),
            out_dir: loc.dataset_dir(),
        }),
        Box::new(DecompressStage {
            scan_dir: loc.dataset_dir(),
            out_dir: loc.decompressed_dir(),
            concurrency: config.concurrency,
        }),
        Box::new(SplitStage {
            scan_dir: loc.dataset_dir(),
            out_dir: loc.tables_dir(),
        }),
        Box::new(TrimStage {
            tables_dir: loc.tables_dir(),
            out_dir: loc.trimmed_dir(),
        }),
    ];

    let run = execute_chain(&stages, progress).await?;

    let report = PipelineReport {
        executed: run.executed,
        skipped: run.skipped,
        trimmed_dir: loc.trimmed_dir(),
        elapsed: start.elapsed(),
    };

    info!(
        executed = report.executed.len(),
        skipped = report.skipped.len(),
        elapsed_ms = report.elapsed.as_millis(),
        "pipeline finished"
    );

    Ok(report)
}

// ---------------------------------------------------------------------------
// Concrete stages
// ---------------------------------------------------------------------------

/// Downloads the supplementary archive.
struct FetchStage {
    client: Client,
    url: Url,
    dest: PathBuf,
}

#[async_trait]
impl Stage for FetchStage {
    fn name(&self) -> &'static str {
        "fetch"
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.dest.clone()]
    }

    async fn run(&self) -> Result<()> {
        fetch_archive(&self.client, &self.url, &self.dest).await
    }
}

/// Unpacks the tar container.
struct ExtractStage {
    tar_path: PathBuf,
    out_dir: PathBuf,
}

#[async_trait]
impl Stage for ExtractStage {
    fn name(&self) -> &'static str {
        "extract"
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.out_dir.clone()]
    }

    async fn run(&self) -> Result<()> {
        let tar_path = self.tar_path.clone();
        let out_dir = self.out_dir.clone();
        tokio::task::spawn_blocking(move || extract_tar(&tar_path, &out_dir))
            .await
            .expect("extract task panicked")
    }
}

/// Gunzips compressed members.
struct DecompressStage {
    scan_dir: PathBuf,
    out_dir: PathBuf,
    concurrency: usize,
}

#[async_trait]
impl Stage for DecompressStage {
    fn name(&self) -> &'static str {
        "decompress"
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.out_dir.clone()]
    }

    async fn run(&self) -> Result<()> {
        decompress_members(&self.scan_dir, &self.out_dir, self.concurrency).await?;
        Ok(())
    }
}

/// Splits sectioned documents into per-section CSV tables.
struct SplitStage {
    scan_dir: PathBuf,
    out_dir: PathBuf,
}

#[async_trait]
impl Stage for SplitStage {
    fn name(&self) -> &'static str {
        "split"
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.out_dir.clone()]
    }

    async fn run(&self) -> Result<()> {
        let scan_dir = self.scan_dir.clone();
        let out_dir = self.out_dir.clone();
        tokio::task::spawn_blocking(move || split_tables(&scan_dir, &out_dir))
            .await
            .expect("split task panicked")?;
        Ok(())
    }
}

/// Projects probe tables down to the retained column schema.
struct TrimStage {
    tables_dir: PathBuf,
    out_dir: PathBuf,
}

#[async_trait]
impl Stage for TrimStage {
    fn name(&self) -> &'static str {
        "trim"
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.out_dir.clone()]
    }

    async fn run(&self) -> Result<()> {
        let tables_dir = self.tables_dir.clone();
        let out_dir = self.out_dir.clone();
        tokio::task::spawn_blocking(move || trim_tables(&tables_dir, &out_dir))
            .await
            .expect("trim task panicked")?;
        Ok(())
    }
}
