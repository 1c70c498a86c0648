use tracing::debug;

use super::llm_output::parse_json_payload;
use super::prompts::{build_extend_system_prompt, build_extend_user_prompt};
use super::{log_fallback, CaseInput, EnrichmentPipeline, Stage};
use crate::domain::enrichment::{EnrichedTestCase, ExtendedPayload, StageOutcome};

impl EnrichmentPipeline {
    /// Stage 1: turns a manual case into implementable steps, selectors and data.
    pub async fn extend(&self, input: CaseInput) -> EnrichedTestCase {
        let CaseInput {
            index,
            case,
            archetype,
            template,
        } = input;

        let system_prompt = build_extend_system_prompt();
        let user_prompt = build_extend_user_prompt(&case, template.as_ref());

        let outcome = match self
            .complete(Stage::Extend, index, &system_prompt, &user_prompt)
            .await
        {
            Ok(output) => match parse_json_payload::<ExtendedPayload>(&output) {
                Ok(payload) => StageOutcome::Parsed(payload),
                Err(reason) => StageOutcome::fallback(ExtendedPayload::fallback_for(&case), reason),
            },
            Err(err) => StageOutcome::fallback(ExtendedPayload::fallback_for(&case), err.to_string()),
        };

        if let StageOutcome::Fallback { reason, .. } = &outcome {
            log_fallback(Stage::Extend, index, reason);
        } else {
            debug!(row = index + 1, "Extended test case");
        }

        let extended_source = outcome.source();
        EnrichedTestCase {
            index,
            case,
            archetype,
            template,
            extended: outcome.into_value(),
            extended_source,
        }
    }
}
