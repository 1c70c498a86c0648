pub mod archetypes;
pub mod batch_pipeline;
pub mod emitter;
pub mod enrichment;
pub mod executor;
pub mod normalizer;
pub mod report_synthesizer;
pub mod scaffolder;
pub mod validator;
