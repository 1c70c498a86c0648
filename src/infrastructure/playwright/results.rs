//! Reads Playwright's JSON reporter output into stats and per-test entries.

use serde_json::{Map, Value};

use crate::domain::report::{ExecutionStats, TestResultEntry, TestStatus};
use crate::shared::json_span::extract_json_object;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRun {
    pub stats: ExecutionStats,
    pub results: Vec<TestResultEntry>,
}

/// Returns `None` when stdout carries no reporter document.
pub fn parse_json_report(stdout: &str) -> Option<ParsedRun> {
    let report = extract_json_object(stdout)?;
    if !report.contains_key("suites") && !report.contains_key("stats") {
        return None;
    }

    let mut results = Vec::new();
    if let Some(suites) = report.get("suites").and_then(Value::as_array) {
        for suite in suites {
            collect_suite(suite, None, &mut results);
        }
    }

    let stats = match report.get("stats").and_then(Value::as_object) {
        Some(stats) => stats_from_reporter(stats),
        None => stats_from_results(&results),
    };

    Some(ParsedRun { stats, results })
}

fn count(stats: &Map<String, Value>, key: &str) -> u32 {
    stats.get(key).and_then(Value::as_u64).unwrap_or(0) as u32
}

fn stats_from_reporter(stats: &Map<String, Value>) -> ExecutionStats {
    ExecutionStats {
        passed: count(stats, "expected") + count(stats, "flaky"),
        failed: count(stats, "unexpected"),
        skipped: count(stats, "skipped"),
        total_time: stats
            .get("duration")
            .and_then(Value::as_f64)
            .map(|ms| ms.max(0.0).round() as u64)
            .unwrap_or(0),
    }
}

fn stats_from_results(results: &[TestResultEntry]) -> ExecutionStats {
    let mut stats = ExecutionStats::default();
    for entry in results {
        match entry.status {
            TestStatus::Passed => stats.passed += 1,
            TestStatus::Failed => stats.failed += 1,
            TestStatus::Skipped => stats.skipped += 1,
        }
        stats.total_time += entry.duration;
    }
    stats
}

fn collect_suite(suite: &Value, parent_file: Option<&str>, out: &mut Vec<TestResultEntry>) {
    let file = suite
        .get("file")
        .and_then(Value::as_str)
        .or(parent_file);

    for spec in suite.get("specs").and_then(Value::as_array).into_iter().flatten() {
        let title = spec
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("(sin título)");
        let spec_file = spec.get("file").and_then(Value::as_str).or(file);

        for test in spec.get("tests").and_then(Value::as_array).into_iter().flatten() {
            out.push(test_entry(title, spec_file, test));
        }
    }

    for child in suite.get("suites").and_then(Value::as_array).into_iter().flatten() {
        collect_suite(child, file, out);
    }
}

fn test_entry(title: &str, file: Option<&str>, test: &Value) -> TestResultEntry {
    let runs: Vec<&Value> = test
        .get("results")
        .and_then(Value::as_array)
        .map(|runs| runs.iter().collect())
        .unwrap_or_default();
    let last = runs.last().copied();

    let status = match test.get("status").and_then(Value::as_str) {
        Some("expected") | Some("flaky") => TestStatus::Passed,
        Some("skipped") => TestStatus::Skipped,
        Some("unexpected") => TestStatus::Failed,
        _ => match last.and_then(|run| run.get("status")).and_then(Value::as_str) {
            Some("passed") => TestStatus::Passed,
            Some("skipped") => TestStatus::Skipped,
            _ => TestStatus::Failed,
        },
    };

    let duration = last
        .and_then(|run| run.get("duration"))
        .and_then(Value::as_f64)
        .map(|ms| ms.max(0.0).round() as u64)
        .unwrap_or(0);

    let error = runs.iter().find_map(|run| {
        run.get("error")
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    let steps = last
        .and_then(|run| run.get("steps"))
        .and_then(Value::as_array)
        .map(|steps| {
            steps
                .iter()
                .filter_map(|step| step.get("title").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    TestResultEntry {
        title: title.to_string(),
        file: file.map(str::to_string),
        status,
        duration,
        error,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{
      "config": {},
      "suites": [{
        "title": "test001-login.spec.js",
        "file": "test001-login.spec.js",
        "specs": [{
          "title": "Login exitoso",
          "tests": [{
            "status": "expected",
            "results": [{"status": "passed", "duration": 1200.4, "steps": [{"title": "page.goto"}, {"title": "expect.toBeVisible"}]}]
          }]
        }],
        "suites": [{
          "title": "grupo",
          "specs": [{
            "title": "Login fallido",
            "tests": [{
              "status": "unexpected",
              "results": [
                {"status": "failed", "duration": 300, "error": {"message": "Timeout 30000ms exceeded"}},
                {"status": "failed", "duration": 350, "error": {"message": "Timeout again"}}
              ]
            }]
          }, {
            "title": "Pendiente",
            "tests": [{"status": "skipped", "results": [{"status": "skipped", "duration": 0}]}]
          }]
        }]
      }],
      "errors": [],
      "stats": {"expected": 1, "unexpected": 1, "flaky": 0, "skipped": 1, "duration": 2150.7}
    }"#;

    #[test]
    fn test_parse_stats_and_nested_suites() {
        let parsed = parse_json_report(REPORT).unwrap();

        assert_eq!(
            parsed.stats,
            ExecutionStats {
                passed: 1,
                failed: 1,
                skipped: 1,
                total_time: 2151,
            }
        );
        assert_eq!(parsed.results.len(), 3);

        let first = &parsed.results[0];
        assert_eq!(first.status, TestStatus::Passed);
        assert_eq!(first.duration, 1200);
        assert_eq!(first.file.as_deref(), Some("test001-login.spec.js"));
        assert_eq!(first.steps, vec!["page.goto", "expect.toBeVisible"]);

        let failed = &parsed.results[1];
        assert_eq!(failed.status, TestStatus::Failed);
        assert_eq!(failed.duration, 350);
        assert_eq!(failed.error.as_deref(), Some("Timeout 30000ms exceeded"));
        assert_eq!(failed.file.as_deref(), Some("test001-login.spec.js"));

        assert_eq!(parsed.results[2].status, TestStatus::Skipped);
    }

    #[test]
    fn test_report_after_log_noise() {
        let stdout = format!("Running 3 tests using 1 worker\n{}\n", REPORT);
        assert_eq!(parse_json_report(&stdout).unwrap().results.len(), 3);
    }

    #[test]
    fn test_stats_derived_when_missing() {
        let stdout = r#"{"suites": [{"specs": [{"title": "a", "tests": [{"results": [{"status": "passed", "duration": 10}]}]}]}]}"#;
        let parsed = parse_json_report(stdout).unwrap();
        assert_eq!(parsed.stats.passed, 1);
        assert_eq!(parsed.stats.total_time, 10);
    }

    #[test]
    fn test_non_report_output_is_none() {
        assert!(parse_json_report("Error: Cannot find module '@playwright/test'").is_none());
        assert!(parse_json_report(r#"{"unrelated": true}"#).is_none());
    }
}
