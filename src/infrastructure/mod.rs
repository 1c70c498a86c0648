pub mod bootstrap;
pub mod config;
pub mod csv;
pub mod llm_clients;
pub mod logging;
pub mod playwright;
pub mod security;
pub mod storage;
pub mod templates;
