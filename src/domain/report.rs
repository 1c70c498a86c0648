use serde::{Deserialize, Serialize};

use super::validation::Severity;

/// Counts captured from one test-framework run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStats {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    /// Wall-clock duration of the run, in milliseconds.
    pub total_time: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResultEntry {
    pub title: String,
    pub file: Option<String>,
    pub status: TestStatus,
    /// Milliseconds.
    pub duration: u64,
    pub error: Option<String>,
    pub steps: Vec<String>,
}

/// Derived totals. Always recomputed from stats and per-test durations.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub success_rate: f64,
    pub total_time: u64,
    pub avg_duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub project_name: String,
    pub timestamp: String,
    pub execution_stats: ExecutionStats,
    pub test_results: Vec<TestResultEntry>,
    pub summary: ReportSummary,
}
