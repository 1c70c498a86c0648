//! Runs a project's suite and turns whatever comes back into report files.
//!
//! Nothing here propagates: spawn failures, non-zero exits and timeouts become
//! an `error-report.html`, so one project never stops the batch loop.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::report_synthesizer::ReportSynthesizer;
use crate::domain::batch::ExecutionOutcome;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::playwright::results::parse_json_report;
use crate::infrastructure::playwright::{RunOutput, TestFramework};

/// Longest stderr/stdout excerpt copied into an error report.
const MAX_OUTPUT_EXCERPT: usize = 8_000;

pub struct Executor {
    framework: Arc<dyn TestFramework + Send + Sync>,
    timeout: Duration,
}

enum Step {
    Finished(Result<RunOutput>),
    Cancelled,
}

impl Executor {
    pub fn new(framework: Arc<dyn TestFramework + Send + Sync>, timeout: Duration) -> Self {
        Self { framework, timeout }
    }

    async fn bounded<F>(&self, cancel: &CancellationToken, what: &str, step: F) -> Step
    where
        F: Future<Output = Result<RunOutput>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Step::Cancelled,
            outcome = tokio::time::timeout(self.timeout, step) => match outcome {
                Ok(result) => Step::Finished(result),
                Err(_) => Step::Finished(Err(AppError::Execution(format!(
                    "{} timed out after {}s",
                    what,
                    self.timeout.as_secs()
                )))),
            },
        }
    }

    pub async fn execute_and_report(
        &self,
        project: &Path,
        project_name: &str,
        cancel: &CancellationToken,
    ) -> ExecutionOutcome {
        if cancel.is_cancelled() {
            return ExecutionOutcome::Cancelled;
        }

        if let Err(err) = ReportSynthesizer::clear_run_reports(project).await {
            warn!(project = project_name, error = %err, "Could not clear previous run reports");
        }

        if self.framework.needs_install(project) {
            match self
                .bounded(cancel, "npm install", self.framework.install(project))
                .await
            {
                Step::Cancelled => return ExecutionOutcome::Cancelled,
                Step::Finished(Ok(output)) if output.success() => {}
                Step::Finished(Ok(output)) => {
                    let message = format!(
                        "npm install exited with code {:?}\n\n{}",
                        output.exit_code,
                        output_excerpt(&output)
                    );
                    return self.fail(project, project_name, &message).await;
                }
                Step::Finished(Err(err)) => {
                    return self.fail(project, project_name, &err.to_string()).await;
                }
            }
        }

        let output = match self
            .bounded(cancel, "playwright test", self.framework.run(project))
            .await
        {
            Step::Cancelled => return ExecutionOutcome::Cancelled,
            Step::Finished(Ok(output)) => output,
            Step::Finished(Err(err)) => {
                return self.fail(project, project_name, &err.to_string()).await;
            }
        };

        if !output.stderr.trim().is_empty() {
            warn!(project = project_name, stderr = %output.stderr.trim(), "Test run wrote to stderr");
        }

        let parsed = parse_json_report(&output.stdout);

        if output.success() {
            let Some(parsed) = parsed else {
                let message = format!(
                    "playwright test exited with code 0 but printed no JSON report\n\n{}",
                    output_excerpt(&output)
                );
                return self.fail(project, project_name, &message).await;
            };
            let report = ReportSynthesizer::build_report(project_name, parsed.results, parsed.stats);
            return match ReportSynthesizer::write_reports(project, &report).await {
                Ok(_) => ExecutionOutcome::Reported,
                Err(err) => self.fail(project, project_name, &err.to_string()).await,
            };
        }

        let message = format!(
            "playwright test exited with code {:?}\n\n{}",
            output.exit_code,
            output_excerpt(&output)
        );
        let outcome = self.fail(project, project_name, &message).await;

        // A failing suite still prints a full JSON report.
        if let Some(parsed) = parsed {
            let report = ReportSynthesizer::build_report(project_name, parsed.results, parsed.stats);
            match ReportSynthesizer::write_reports(project, &report).await {
                Ok(_) => return ExecutionOutcome::ErrorWithResults,
                Err(err) => {
                    error!(project = project_name, error = %err, "Failed to write executive report");
                }
            }
        }
        outcome
    }

    async fn fail(&self, project: &Path, project_name: &str, message: &str) -> ExecutionOutcome {
        error!(project = project_name, error = %message.lines().next().unwrap_or(""), "Test execution failed");
        match ReportSynthesizer::write_error_report(project, project_name, message).await {
            Ok(path) => info!(path = %path.display(), "Error report written"),
            Err(err) => error!(project = project_name, error = %err, "Failed to write error report"),
        }
        ExecutionOutcome::ErrorReported
    }
}

fn output_excerpt(output: &RunOutput) -> String {
    let text = if output.stderr.trim().is_empty() {
        output.stdout.trim()
    } else {
        output.stderr.trim()
    };
    match text.char_indices().nth(MAX_OUTPUT_EXCERPT) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
