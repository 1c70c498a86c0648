pub mod app_config;
pub mod archetype;
pub mod batch;
pub mod enrichment;
pub mod error;
pub mod llm_config;
pub mod report;
pub mod test_case;
pub mod validation;

// Raw tabular rows
pub mod csv;
