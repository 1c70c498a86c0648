//! Playwright CLI wrapper: dependency install plus a JSON-reporter test run.
//!
//! Both steps run as child processes in the project directory. Children are
//! killed when their future is dropped, so a cancelled run leaves no orphans.

pub mod results;

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::error::{AppError, Result};

/// Captured output of one framework invocation.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// External test framework. `run` errors only when the process cannot be
/// spawned; a failing suite is a successful invocation with a non-zero code.
#[async_trait]
pub trait TestFramework {
    /// True when the project still needs its dependencies installed.
    fn needs_install(&self, project: &Path) -> bool;

    async fn install(&self, project: &Path) -> Result<RunOutput>;

    async fn run(&self, project: &Path) -> Result<RunOutput>;
}

pub struct PlaywrightRunner;

impl PlaywrightRunner {
    pub fn new() -> Self {
        Self
    }

    fn program(name: &str) -> String {
        if cfg!(windows) {
            format!("{}.cmd", name)
        } else {
            name.to_string()
        }
    }

    async fn exec(&self, project: &Path, program: &str, args: &[&str]) -> Result<RunOutput> {
        debug!(project = %project.display(), program, ?args, "Spawning process");

        let output = Command::new(Self::program(program))
            .args(args)
            .current_dir(project)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                AppError::Execution(format!("Failed to run {} {}: {}", program, args.join(" "), e))
            })?;

        Ok(RunOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

impl Default for PlaywrightRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TestFramework for PlaywrightRunner {
    fn needs_install(&self, project: &Path) -> bool {
        !project.join("node_modules").is_dir()
    }

    async fn install(&self, project: &Path) -> Result<RunOutput> {
        info!(project = %project.display(), "Installing dependencies");
        self.exec(project, "npm", &["install"]).await
    }

    async fn run(&self, project: &Path) -> Result<RunOutput> {
        info!(project = %project.display(), "Running tests");
        self.exec(project, "npx", &["playwright", "test", "--reporter=json"])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_install_follows_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        let runner = PlaywrightRunner::new();
        assert!(runner.needs_install(dir.path()));

        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        assert!(!runner.needs_install(dir.path()));
    }

    #[test]
    fn test_run_output_success() {
        let ok = RunOutput {
            exit_code: Some(0),
            ..RunOutput::default()
        };
        let failed = RunOutput {
            exit_code: Some(1),
            ..RunOutput::default()
        };
        assert!(ok.success());
        assert!(!failed.success());
        assert!(!RunOutput::default().success());
    }
}
