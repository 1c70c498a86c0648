use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::debug;

use crate::domain::app_config::BrowserEngine;
use crate::domain::error::Result;
use crate::infrastructure::storage::{ensure_dir, write_atomic};

pub const TESTS_DIR: &str = "tests";
pub const REPORTS_DIR: &str = "reports";
pub const PLAYWRIGHT_VERSION: &str = "^1.40.0";

/// Creates the on-disk layout of a project. Safe to call on an existing project;
/// the static files are rewritten with the same content.
pub struct ProjectScaffolder {
    browser: BrowserEngine,
    headless: bool,
}

impl ProjectScaffolder {
    pub fn new(browser: BrowserEngine, headless: bool) -> Self {
        Self { browser, headless }
    }

    pub async fn scaffold(&self, output_root: &Path, project_name: &str) -> Result<PathBuf> {
        let project = output_root.join(project_name);
        ensure_dir(&project.join(TESTS_DIR)).await?;
        ensure_dir(&project.join(REPORTS_DIR)).await?;

        write_atomic(&project.join("playwright.config.js"), self.playwright_config()).await?;
        write_atomic(&project.join("package.json"), package_manifest(project_name)?).await?;

        debug!(project = %project.display(), "Project scaffolded");
        Ok(project)
    }

    fn playwright_config(&self) -> String {
        format!(
            r#"import {{ defineConfig, devices }} from '@playwright/test';

export default defineConfig({{
  testDir: './{tests}',
  fullyParallel: true,
  forbidOnly: !!process.env.CI,
  retries: process.env.CI ? 2 : 0,
  workers: process.env.CI ? 1 : undefined,
  reporter: [
    ['html', {{ outputFolder: './{reports}/html-report', open: 'never' }}],
    ['json', {{ outputFile: './{reports}/results.json' }}],
    ['junit', {{ outputFile: './{reports}/results.xml' }}]
  ],
  use: {{
    baseURL: 'http://localhost:3000',
    headless: {headless},
    trace: 'on-first-retry',
    screenshot: 'only-on-failure',
    video: 'retain-on-failure',
  }},
  projects: [
    {{
      name: '{browser}',
      use: {{ ...devices['{device}'] }},
    }},
  ],
}});
"#,
            tests = TESTS_DIR,
            reports = REPORTS_DIR,
            headless = self.headless,
            browser = self.browser.as_str(),
            device = self.browser.device(),
        )
    }
}

/// npm package names: lower-case, `[a-z0-9-]` only.
pub fn package_name(project_name: &str) -> String {
    let name: String = project_name
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if name.trim_matches('-').is_empty() {
        "testforge-project".to_string()
    } else {
        name
    }
}

fn package_manifest(project_name: &str) -> Result<String> {
    let manifest = json!({
        "name": package_name(project_name),
        "version": "1.0.0",
        "private": true,
        "scripts": {
            "test": "playwright test",
            "test:headed": "playwright test --headed",
            "report": "playwright show-report reports/html-report"
        },
        "devDependencies": {
            "@playwright/test": PLAYWRIGHT_VERSION
        }
    });
    Ok(serde_json::to_string_pretty(&manifest)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("Casos Login_v2"), "casos-login-v2");
        assert_eq!(package_name("¿?"), "testforge-project");
    }

    #[tokio::test]
    async fn test_scaffold_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let scaffolder = ProjectScaffolder::new(BrowserEngine::Firefox, true);

        let first = scaffolder.scaffold(dir.path(), "casos").await.unwrap();
        std::fs::write(first.join("tests/keep.spec.js"), "// mine").unwrap();
        let second = scaffolder.scaffold(dir.path(), "casos").await.unwrap();

        assert_eq!(first, second);
        assert!(second.join("reports").is_dir());
        assert!(second.join("tests/keep.spec.js").is_file());

        let config = std::fs::read_to_string(second.join("playwright.config.js")).unwrap();
        assert!(config.contains("testDir: './tests'"));
        assert!(config.contains("headless: true"));
        assert!(config.contains("devices['Desktop Firefox']"));

        let manifest: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(second.join("package.json")).unwrap())
                .unwrap();
        assert_eq!(manifest["name"], "casos");
        assert_eq!(manifest["devDependencies"]["@playwright/test"], PLAYWRIGHT_VERSION);
    }
}
