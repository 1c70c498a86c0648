//! Three-stage enrichment chain: extend -> analyze gaps -> generate code.
//!
//! Every stage asks the generative service for a completion and falls back to a
//! deterministic payload when the call fails, times out, or returns something
//! unparseable. No stage error escapes this module.

mod code_generator;
mod extender;
mod gap_analyzer;
mod llm_output;
mod prompts;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::archetype::{ArchetypeLabel, ArchetypeTemplate};
use crate::domain::enrichment::GeneratedCase;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::test_case::TestCase;
use crate::infrastructure::llm_clients::LLMClient;

/// Identifies a stage in logs and fallback reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extend,
    Analyze,
    Generate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extend => "extend",
            Stage::Analyze => "analyze",
            Stage::Generate => "generate",
        }
    }
}

/// A classified row entering Stage 1.
#[derive(Debug, Clone)]
pub struct CaseInput {
    /// Position of the row in its batch (0-based).
    pub index: usize,
    pub case: TestCase,
    pub archetype: ArchetypeLabel,
    pub template: Option<ArchetypeTemplate>,
}

pub struct EnrichmentPipeline {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
}

impl EnrichmentPipeline {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>, config: LLMConfig) -> Self {
        Self { llm_client, config }
    }

    /// Runs all three stages for one row, strictly in order.
    pub async fn run(&self, input: CaseInput) -> GeneratedCase {
        let enriched = self.extend(input).await;
        let analyzed = self.analyze(enriched).await;
        self.generate(analyzed).await
    }

    /// One bounded call to the generative service.
    async fn complete(&self, stage: Stage, index: usize, system: &str, user: &str) -> Result<String> {
        debug!(stage = stage.as_str(), row = index + 1, prompt_chars = user.len(), "Calling LLM");

        let call = self.llm_client.generate(&self.config, system, user);
        match tokio::time::timeout(self.config.timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::LLMError(format!(
                "timed out after {}s",
                self.config.timeout().as_secs()
            ))),
        }
    }
}

fn log_fallback(stage: Stage, index: usize, reason: &str) {
    warn!(
        stage = stage.as_str(),
        row = index + 1,
        reason = %reason,
        "Stage fell back to default payload"
    );
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::domain::error::{AppError, Result};
    use crate::domain::llm_config::LLMConfig;
    use crate::infrastructure::llm_clients::LLMClient;

    /// Replays scripted completions in call order. `None` simulates a service failure.
    pub(crate) struct ScriptedClient {
        replies: Mutex<VecDeque<Option<String>>>,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        pub(crate) fn new(replies: Vec<Option<&str>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|reply| reply.map(str::to_string))
                        .collect(),
                ),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self::new(Vec::new())
        }
    }

    #[async_trait]
    impl LLMClient for ScriptedClient {
        async fn generate(&self, _config: &LLMConfig, _system: &str, user: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(user.to_string());
            match self.replies.lock().unwrap().pop_front().flatten() {
                Some(reply) => Ok(reply),
                None => Err(AppError::LLMError("quota exceeded".to_string())),
            }
        }
    }

    /// Never answers; used to exercise the call timeout.
    pub(crate) struct StalledClient;

    #[async_trait]
    impl LLMClient for StalledClient {
        async fn generate(&self, _config: &LLMConfig, _system: &str, _user: &str) -> Result<String> {
            std::future::pending::<()>().await;
            Err(AppError::Internal("unreachable".to_string()))
        }
    }
}
