use super::llm_output::{fallback_skeleton, normalize_generated_code};
use super::prompts::{build_generate_system_prompt, build_generate_user_prompt};
use super::{log_fallback, EnrichmentPipeline, Stage};
use crate::domain::enrichment::{AnalyzedTestCase, GeneratedArtifact, GeneratedCase, StageOutcome};

impl EnrichmentPipeline {
    /// Stage 3: produces the test source. Always returns non-empty code.
    pub async fn generate(&self, analyzed: AnalyzedTestCase) -> GeneratedCase {
        let index = analyzed.enriched.index;
        let system_prompt = build_generate_system_prompt();
        let user_prompt = build_generate_user_prompt(&analyzed);

        let outcome = match self
            .complete(Stage::Generate, index, &system_prompt, &user_prompt)
            .await
        {
            Ok(output) => match normalize_generated_code(&output) {
                Some(code) => StageOutcome::Parsed(code),
                None => StageOutcome::fallback(
                    fallback_skeleton(analyzed.case()),
                    "empty code after cleanup",
                ),
            },
            Err(err) => StageOutcome::fallback(fallback_skeleton(analyzed.case()), err.to_string()),
        };

        if let StageOutcome::Fallback { reason, .. } = &outcome {
            log_fallback(Stage::Generate, index, reason);
        }

        let source = outcome.source();
        GeneratedCase {
            analyzed,
            artifact: GeneratedArtifact {
                code: outcome.into_value(),
                source,
            },
        }
    }
}
