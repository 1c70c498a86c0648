//! One input file in, one project out.
//!
//! parse -> normalize -> scaffold -> validate (report only) -> per row
//! {classify -> enrich -> emit} -> execute. Rows are handled one at a time, in
//! input order, so artifact N is on disk before row N+1 starts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::archetypes::{classify, ArchetypeStore};
use super::emitter::ArtifactEmitter;
use super::enrichment::{CaseInput, EnrichmentPipeline};
use super::executor::Executor;
use super::normalizer::Normalizer;
use super::report_synthesizer::ReportSynthesizer;
use super::scaffolder::ProjectScaffolder;
use super::validator::Validator;
use crate::domain::archetype::ArchetypeLabel;
use crate::domain::batch::{BatchId, BatchSummary, ExecutionOutcome};
use crate::domain::error::{AppError, Result};
use crate::domain::test_case::TestCase;
use crate::infrastructure::csv::read_sheet;

/// Hands out project names for the session. Re-processing the same source
/// reuses its name; a different source with a taken name gets `-2`, `-3`, ...
#[derive(Debug, Default)]
pub struct BatchRegistry {
    claimed: HashMap<String, PathBuf>,
}

impl BatchRegistry {
    pub fn claim(&mut self, source: &Path) -> BatchId {
        let base = project_name_for(source);
        let mut name = base.clone();
        let mut suffix = 1;

        loop {
            match self.claimed.get(&name) {
                None => {
                    self.claimed.insert(name.clone(), source.to_path_buf());
                    break;
                }
                Some(owner) if owner == source => break,
                Some(_) => {
                    suffix += 1;
                    name = format!("{}-{}", base, suffix);
                }
            }
        }

        BatchId {
            name,
            source: source.to_path_buf(),
        }
    }
}

fn project_name_for(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().trim().to_string())
        .unwrap_or_default();
    if stem.is_empty() || stem.starts_with('.') {
        "batch".to_string()
    } else {
        stem
    }
}

pub struct BatchPipeline {
    enrichment: EnrichmentPipeline,
    archetypes: ArchetypeStore,
    scaffolder: ProjectScaffolder,
    executor: Executor,
    output_root: PathBuf,
    use_archetypes: bool,
    registry: Mutex<BatchRegistry>,
}

impl BatchPipeline {
    pub fn new(
        enrichment: EnrichmentPipeline,
        archetypes: ArchetypeStore,
        scaffolder: ProjectScaffolder,
        executor: Executor,
        output_root: impl Into<PathBuf>,
        use_archetypes: bool,
    ) -> Self {
        Self {
            enrichment,
            archetypes,
            scaffolder,
            executor,
            output_root: output_root.into(),
            use_archetypes,
            registry: Mutex::new(BatchRegistry::default()),
        }
    }

    fn claim(&self, source: &Path) -> Result<BatchId> {
        let mut registry = self
            .registry
            .lock()
            .map_err(|_| AppError::Internal("Batch registry lock poisoned".to_string()))?;
        Ok(registry.claim(source))
    }

    async fn case_input(&self, index: usize, case: TestCase) -> CaseInput {
        let archetype = classify(&case.scenario, &case.actions);
        let template = if self.use_archetypes && archetype != ArchetypeLabel::Generic {
            self.archetypes.template(archetype).await
        } else {
            None
        };
        debug!(row = index + 1, archetype = %archetype, has_template = template.is_some(), "Row classified");

        CaseInput {
            index,
            case,
            archetype,
            template,
        }
    }

    /// Errors only for unreadable input or file-system failures; every
    /// service or execution failure is absorbed into fallbacks and reports.
    pub async fn process_file(
        &self,
        source: &Path,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary> {
        let batch = self.claim(source)?;
        info!(batch = %batch.name, source = %source.display(), "Processing input file");

        let path = source.to_path_buf();
        let sheet = tokio::task::spawn_blocking(move || read_sheet(&path))
            .await
            .map_err(|e| AppError::Internal(format!("Reader task failed: {}", e)))??;
        let cases = Normalizer::normalize_all(&sheet.rows);
        info!(batch = %batch.name, rows = cases.len(), "Input parsed");

        let project = self.scaffolder.scaffold(&self.output_root, &batch.name).await?;

        let validation = Validator::validate_sheet(&sheet.headers, &cases);
        if validation.is_valid {
            info!(batch = %batch.name, warnings = validation.warnings.len(), "Validation passed");
        } else {
            warn!(
                batch = %batch.name,
                errors = validation.errors.len(),
                valid_rows = validation.valid_rows,
                total_rows = validation.total_rows,
                "Validation found errors; continuing"
            );
        }
        let validation_report = Validator::report(validation.clone());
        if let Err(err) =
            ReportSynthesizer::write_validation_report(&project, &batch.name, &validation_report)
                .await
        {
            warn!(batch = %batch.name, error = %err, "Failed to write validation report");
        }

        let rows = cases.len();
        let mut artifacts = Vec::with_capacity(rows);
        let mut fallback_rows = 0;
        let mut cancelled = false;

        for (index, case) in cases.into_iter().enumerate() {
            let input = self.case_input(index, case).await;
            let generated = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                generated = self.enrichment.run(input) => Some(generated),
            };
            let Some(generated) = generated else {
                cancelled = true;
                break;
            };

            let fallbacks = generated.fallback_stages();
            if !fallbacks.is_empty() {
                fallback_rows += 1;
            }

            let path = ArtifactEmitter::emit(
                &project,
                index + 1,
                &generated.artifact,
                &generated.case().scenario,
            )
            .await?;
            info!(
                batch = %batch.name,
                row = index + 1,
                file = %path.display(),
                fallbacks = ?fallbacks,
                "Artifact emitted"
            );
            artifacts.push(path);
        }

        let execution = if cancelled {
            warn!(batch = %batch.name, emitted = artifacts.len(), "Batch interrupted");
            ExecutionOutcome::Cancelled
        } else if artifacts.is_empty() {
            warn!(batch = %batch.name, "No artifacts to run; skipping execution");
            ExecutionOutcome::Skipped
        } else {
            self.executor
                .execute_and_report(&project, &batch.name, cancel)
                .await
        };

        Ok(BatchSummary {
            project_path: project,
            batch,
            rows,
            artifacts,
            fallback_rows,
            validation,
            execution,
        })
    }
}
