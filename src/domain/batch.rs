use serde::Serialize;
use std::path::{Path, PathBuf};

use super::validation::ValidationResult;

/// Identity of one input file's batch, allocated once and passed through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BatchId {
    /// Project directory name under the output root.
    pub name: String,
    /// Input file the batch was read from.
    pub source: PathBuf,
}

impl BatchId {
    pub fn project_path(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Run finished and the executive report was written.
    Reported,
    /// Invocation failed; an error report was written instead.
    ErrorReported,
    /// Run failed but its output still carried results; both reports were written.
    ErrorWithResults,
    /// Nothing to run: the batch produced no artifacts.
    Skipped,
    /// Interrupted before or during execution.
    Cancelled,
}

/// What happened to one batch, for logging.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub batch: BatchId,
    pub project_path: PathBuf,
    pub rows: usize,
    pub artifacts: Vec<PathBuf>,
    pub fallback_rows: usize,
    pub validation: ValidationResult,
    pub execution: ExecutionOutcome,
}
