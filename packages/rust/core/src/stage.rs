//! Stage abstraction and the skip-if-exists execution loop.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use geoflow_shared::{GeoflowError, Result};

/// One step of the pipeline, with declared output targets.
///
/// On success, `run` must leave every declared output target present and
/// in its final form; downstream stages never observe a partial output.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Short stable name, used in logs and stage-failure errors.
    fn name(&self) -> &'static str;

    /// Declared output targets (files or directories).
    fn outputs(&self) -> Vec<PathBuf>;

    /// Produce the outputs. Only invoked when the stage is not complete.
    async fn run(&self) -> Result<()>;

    /// A stage is complete when every declared output target exists.
    fn is_complete(&self) -> bool {
        let outputs = self.outputs();
        !outputs.is_empty() && outputs.iter().all(|p| p.exists())
    }
}

/// Observer for stage-level progress (CLI spinner, tests).
pub trait StageProgress: Send + Sync {
    /// Called when a stage's run operation is about to be invoked.
    fn stage_started(&self, _name: &str) {}
    /// Called when a stage is skipped because its outputs exist.
    fn stage_skipped(&self, _name: &str) {}
}

/// No-op progress observer for headless/test usage.
pub struct SilentProgress;

impl StageProgress for SilentProgress {}

/// What the executor did with each stage.
#[derive(Debug, Default)]
pub struct StageRun {
    /// Names of stages whose run operation was invoked, in order.
    pub executed: Vec<&'static str>,
    /// Names of stages skipped because their outputs already existed.
    pub skipped: Vec<&'static str>,
}

/// Execute a dependency-ordered chain of stages.
///
/// Leading complete stages are skipped ("trust existing outputs" — no
/// staleness check, ever). From the first incomplete stage onward every
/// stage runs, so a rerun resumes exactly there and downstream outputs
/// are rebuilt against the fresh upstream. The first failure aborts the
/// chain, wrapped with the failing stage's name.
pub async fn execute_chain(
    stages: &[Box<dyn Stage>],
    progress: &dyn StageProgress,
) -> Result<StageRun> {
    let mut run = StageRun::default();
    let mut resumed = false;

    for stage in stages {
        if !resumed && stage.is_complete() {
            debug!(stage = stage.name(), "outputs present, skipping");
            progress.stage_skipped(stage.name());
            run.skipped.push(stage.name());
            continue;
        }
        resumed = true;

        info!(stage = stage.name(), "running stage");
        progress.stage_started(stage.name());
        stage
            .run()
            .await
            .map_err(|e| GeoflowError::stage(stage.name(), e))?;
        run.executed.push(stage.name());
    }

    Ok(run)
}
