//! Summary arithmetic, recommendation rules and the files under `reports/`.

use std::path::{Path, PathBuf};

use tracing::info;

use super::scaffolder::REPORTS_DIR;
use crate::domain::error::Result;
use crate::domain::report::{ExecutionStats, Recommendation, Report, ReportSummary, TestResultEntry};
use crate::domain::validation::{Severity, ValidationReport};
use crate::infrastructure::storage::{ensure_dir, remove_if_exists, write_atomic};
use crate::infrastructure::templates::{error_html, report_html, validation_html, REPORT_CSS};

pub const EXECUTIVE_REPORT: &str = "reporte-ejecutivo.html";
pub const REPORT_STYLES: &str = "styles.css";
pub const REPORT_DATA: &str = "reporte-datos.json";
pub const VALIDATION_REPORT: &str = "validacion-csv.html";
pub const ERROR_REPORT: &str = "error-report.html";

const LOW_SUCCESS_RATE: f64 = 0.8;
const SLOW_AVG_DURATION_MS: f64 = 10_000.0;

pub struct ReportSynthesizer;

impl ReportSynthesizer {
    /// Counts come from the stats; time comes from the per-test durations.
    pub fn summarize(results: &[TestResultEntry], stats: &ExecutionStats) -> ReportSummary {
        let total = stats.passed + stats.failed + stats.skipped;
        let total_time: u64 = results.iter().map(|test| test.duration).sum();
        let (avg_duration, success_rate) = if total > 0 {
            (
                total_time as f64 / total as f64,
                stats.passed as f64 / total as f64,
            )
        } else {
            (0.0, 0.0)
        };

        ReportSummary {
            total,
            passed: stats.passed,
            failed: stats.failed,
            skipped: stats.skipped,
            success_rate,
            total_time,
            avg_duration,
        }
    }

    pub fn recommendations(summary: &ReportSummary) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if summary.failed > 0 {
            recommendations.push(Recommendation {
                severity: Severity::Error,
                title: "Tests Fallidos".to_string(),
                message: format!(
                    "Se detectaron {} tests fallidos. Revisa los errores y selectores utilizados.",
                    summary.failed
                ),
            });
        }

        if summary.success_rate < LOW_SUCCESS_RATE {
            recommendations.push(Recommendation {
                severity: Severity::Warning,
                title: "Tasa de Éxito Baja".to_string(),
                message: "La tasa de éxito es menor al 80%. Considera revisar la estabilidad de los selectores."
                    .to_string(),
            });
        }

        if summary.avg_duration > SLOW_AVG_DURATION_MS {
            recommendations.push(Recommendation {
                severity: Severity::Info,
                title: "Rendimiento".to_string(),
                message: "Algunos tests tardan más de 10 segundos. Considera optimizar los tiempos de espera."
                    .to_string(),
            });
        }

        if recommendations.is_empty() {
            recommendations.push(Recommendation {
                severity: Severity::Success,
                title: "¡Excelente!".to_string(),
                message: "Todos los tests se ejecutaron correctamente sin problemas detectados."
                    .to_string(),
            });
        }

        recommendations
    }

    pub fn build_report(
        project_name: &str,
        results: Vec<TestResultEntry>,
        stats: ExecutionStats,
    ) -> Report {
        let summary = Self::summarize(&results, &stats);
        Report {
            project_name: project_name.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_stats: stats,
            test_results: results,
            summary,
        }
    }

    /// Drops the executive, data and error reports of a previous run so that
    /// `reports/` only ever describes the latest one.
    pub async fn clear_run_reports(project: &Path) -> Result<()> {
        let reports = project.join(REPORTS_DIR);
        for name in [EXECUTIVE_REPORT, REPORT_DATA, ERROR_REPORT] {
            remove_if_exists(&reports.join(name)).await?;
        }
        Ok(())
    }

    /// Writes the executive page, its stylesheet and the JSON mirror.
    /// Returns the path of the HTML page.
    pub async fn write_reports(project: &Path, report: &Report) -> Result<PathBuf> {
        let reports = project.join(REPORTS_DIR);
        ensure_dir(&reports).await?;

        let recommendations = Self::recommendations(&report.summary);
        let html_path = reports.join(EXECUTIVE_REPORT);
        write_atomic(&html_path, report_html::render(report, &recommendations)).await?;
        write_atomic(&reports.join(REPORT_STYLES), REPORT_CSS).await?;
        write_atomic(
            &reports.join(REPORT_DATA),
            serde_json::to_string_pretty(report)?,
        )
        .await?;

        info!(
            outcome = "success",
            path = %html_path.display(),
            passed = report.summary.passed,
            failed = report.summary.failed,
            skipped = report.summary.skipped,
            "Executive report written"
        );
        Ok(html_path)
    }

    pub async fn write_error_report(
        project: &Path,
        project_name: &str,
        message: &str,
    ) -> Result<PathBuf> {
        let reports = project.join(REPORTS_DIR);
        ensure_dir(&reports).await?;

        let path = reports.join(ERROR_REPORT);
        let timestamp = chrono::Utc::now().to_rfc3339();
        write_atomic(&path, error_html::render(project_name, &timestamp, message)).await?;
        Ok(path)
    }

    pub async fn write_validation_report(
        project: &Path,
        project_name: &str,
        report: &ValidationReport,
    ) -> Result<PathBuf> {
        let reports = project.join(REPORTS_DIR);
        ensure_dir(&reports).await?;

        let path = reports.join(VALIDATION_REPORT);
        write_atomic(&path, validation_html::render(project_name, report)).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::TestStatus;

    fn stats(passed: u32, failed: u32, skipped: u32) -> ExecutionStats {
        ExecutionStats {
            passed,
            failed,
            skipped,
            total_time: 0,
        }
    }

    fn entry(duration: u64) -> TestResultEntry {
        TestResultEntry {
            title: "t".to_string(),
            file: None,
            status: TestStatus::Passed,
            duration,
            error: None,
            steps: Vec::new(),
        }
    }

    fn titles(summary: &ReportSummary) -> Vec<String> {
        ReportSynthesizer::recommendations(summary)
            .into_iter()
            .map(|rec| rec.title)
            .collect()
    }

    #[test]
    fn test_summary_arithmetic() {
        let summary = ReportSynthesizer::summarize(&[entry(100), entry(300)], &stats(7, 2, 1));
        assert_eq!(summary.total, 10);
        assert!((summary.success_rate - 0.7).abs() < f64::EPSILON);
        assert_eq!(summary.total_time, 400);
        assert!((summary.avg_duration - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_of_empty_run() {
        let summary = ReportSynthesizer::summarize(&[], &ExecutionStats::default());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.avg_duration, 0.0);
    }

    #[test]
    fn test_low_success_rate_without_failures() {
        let summary = ReportSynthesizer::summarize(&[], &stats(3, 0, 1));
        assert_eq!(summary.success_rate, 0.75);
        assert_eq!(titles(&summary), vec!["Tasa de Éxito Baja"]);
    }

    #[test]
    fn test_all_good_is_excellent_only() {
        let summary = ReportSynthesizer::summarize(&[entry(500), entry(700)], &stats(2, 0, 0));
        assert_eq!(titles(&summary), vec!["¡Excelente!"]);
    }

    #[test]
    fn test_rules_fire_independently_in_order() {
        let summary = ReportSynthesizer::summarize(&[entry(25_000), entry(25_000)], &stats(1, 1, 0));
        assert_eq!(
            titles(&summary),
            vec!["Tests Fallidos", "Tasa de Éxito Baja", "Rendimiento"]
        );
    }

    #[tokio::test]
    async fn test_clear_run_reports_keeps_validation_report() {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join(REPORTS_DIR);
        std::fs::create_dir_all(&reports).unwrap();
        for name in [EXECUTIVE_REPORT, REPORT_DATA, ERROR_REPORT, VALIDATION_REPORT] {
            std::fs::write(reports.join(name), "old").unwrap();
        }

        ReportSynthesizer::clear_run_reports(dir.path()).await.unwrap();

        assert!(!reports.join(EXECUTIVE_REPORT).exists());
        assert!(!reports.join(REPORT_DATA).exists());
        assert!(!reports.join(ERROR_REPORT).exists());
        assert!(reports.join(VALIDATION_REPORT).is_file());
    }

    #[tokio::test]
    async fn test_write_reports_creates_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = ReportSynthesizer::build_report("casos", vec![entry(10)], stats(1, 0, 0));

        let html = ReportSynthesizer::write_reports(dir.path(), &report).await.unwrap();

        let reports = dir.path().join(REPORTS_DIR);
        assert_eq!(html, reports.join(EXECUTIVE_REPORT));
        assert!(reports.join(REPORT_STYLES).is_file());
        let data: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(reports.join(REPORT_DATA)).unwrap())
                .unwrap();
        assert_eq!(data["projectName"], "casos");
        assert_eq!(data["summary"]["total"], 1);
        assert_eq!(data["executionStats"]["totalTime"], 0);
    }
}
