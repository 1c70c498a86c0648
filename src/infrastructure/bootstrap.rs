use std::sync::Arc;

use crate::application::use_cases::archetypes::ArchetypeStore;
use crate::application::use_cases::batch_pipeline::BatchPipeline;
use crate::application::use_cases::enrichment::EnrichmentPipeline;
use crate::application::use_cases::executor::Executor;
use crate::application::use_cases::scaffolder::ProjectScaffolder;
use crate::domain::app_config::AppConfig;
use crate::infrastructure::llm_clients::{LLMClient, RouterClient};
use crate::infrastructure::playwright::{PlaywrightRunner, TestFramework};

/// Wires the production adapters into a batch pipeline.
pub fn build_pipeline(config: &AppConfig) -> BatchPipeline {
    let llm_config = config.llm_config();
    let llm_client: Arc<dyn LLMClient + Send + Sync> = Arc::new(RouterClient::new(&llm_config));
    let framework: Arc<dyn TestFramework + Send + Sync> = Arc::new(PlaywrightRunner::new());

    BatchPipeline::new(
        EnrichmentPipeline::new(llm_client, llm_config),
        ArchetypeStore::new(config.archetypes_dir.clone()),
        ProjectScaffolder::new(config.playwright_browser, config.playwright_headless),
        Executor::new(framework, config.execution_timeout()),
        config.output_dir.clone(),
        config.use_archetypes,
    )
}
