use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use crate::infrastructure::config::CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(name = "testforge")]
#[command(about = "Watches a folder of test-case sheets and turns each into a Playwright project")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TESTFORGE_CONFIG", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Folder watched for CSV/XLSX input
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Folder where projects are generated
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Folder holding the archetype templates
    #[arg(short, long)]
    pub archetypes: Option<PathBuf>,

    /// Log filter (e.g. `info`, `testforge_lib=debug`)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Verbose diagnostics: source locations and full error details
    #[arg(short, long)]
    pub debug: bool,

    /// Process the files already in the input folder, then exit
    #[arg(long)]
    pub once: bool,

    /// Read an API key from stdin, store it in the OS keyring, and exit
    #[arg(long)]
    pub store_api_key: bool,
}

/// CLI values layered over file and environment configuration.
/// Unset options are omitted so they do not shadow lower layers.
#[derive(Debug, Default, Serialize)]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archetypes_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_mode: Option<bool>,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            input_dir: self.input.clone(),
            output_dir: self.output.clone(),
            archetypes_dir: self.archetypes.clone(),
            log_level: self.log_level.clone(),
            debug_mode: self.debug.then_some(true),
        }
    }
}
