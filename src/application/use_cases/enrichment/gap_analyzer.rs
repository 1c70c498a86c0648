use tracing::debug;

use super::llm_output::parse_json_payload;
use super::prompts::{build_analyze_system_prompt, build_analyze_user_prompt};
use super::{log_fallback, EnrichmentPipeline, Stage};
use crate::domain::enrichment::{AnalysisPayload, AnalyzedTestCase, EnrichedTestCase, StageOutcome};

impl EnrichmentPipeline {
    /// Stage 2: lists the data the extended case still needs (URLs, credentials, ...).
    pub async fn analyze(&self, enriched: EnrichedTestCase) -> AnalyzedTestCase {
        let index = enriched.index;
        let system_prompt = build_analyze_system_prompt();
        let user_prompt = build_analyze_user_prompt(&enriched);

        let outcome = match self
            .complete(Stage::Analyze, index, &system_prompt, &user_prompt)
            .await
        {
            Ok(output) => match parse_json_payload::<AnalysisPayload>(&output) {
                Ok(payload) => StageOutcome::Parsed(payload),
                Err(reason) => StageOutcome::fallback(AnalysisPayload::default(), reason),
            },
            Err(err) => StageOutcome::fallback(AnalysisPayload::default(), err.to_string()),
        };

        match &outcome {
            StageOutcome::Fallback { reason, .. } => log_fallback(Stage::Analyze, index, reason),
            StageOutcome::Parsed(payload) if !payload.missing_critical.is_empty() => {
                debug!(
                    row = index + 1,
                    missing = ?payload.missing_critical,
                    "Analysis reported missing critical data"
                );
            }
            StageOutcome::Parsed(_) => {}
        }

        let analyzed_source = outcome.source();
        AnalyzedTestCase {
            enriched,
            analyzed: outcome.into_value(),
            analyzed_source,
        }
    }
}
