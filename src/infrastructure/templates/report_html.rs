use std::fmt::Write;

use super::{display_timestamp, escape_html};
use crate::domain::report::{Recommendation, Report, ReportSummary, TestResultEntry};

fn percent(part: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn summary_cards(summary: &ReportSummary) -> String {
    let cards = [
        ("success", "✅", summary.passed.to_string(), "Tests Exitosos"),
        ("error", "❌", summary.failed.to_string(), "Tests Fallidos"),
        ("warning", "⏭️", summary.skipped.to_string(), "Tests Omitidos"),
        ("info", "⏱️", format!("{}ms", summary.total_time), "Tiempo Total"),
    ];

    let mut html = String::from("<div class=\"summary-grid\">\n");
    for (class, icon, value, label) in cards {
        let _ = write!(
            html,
            "  <div class=\"summary-card {class}\">\n    <div class=\"card-icon\">{icon}</div>\n    <div class=\"card-content\"><h3>{value}</h3><p>{label}</p></div>\n  </div>\n"
        );
    }
    let _ = write!(
        html,
        "  <div class=\"summary-card info\">\n    <div class=\"card-icon\">🎯</div>\n    <div class=\"card-content\"><h3>{:.1}%</h3><p>Tasa de Éxito</p></div>\n  </div>\n",
        summary.success_rate * 100.0
    );
    html.push_str("</div>");
    html
}

fn execution_chart(summary: &ReportSummary) -> String {
    let segments = [
        ("success", "Exitosos", percent(summary.passed, summary.total)),
        ("error", "Fallidos", percent(summary.failed, summary.total)),
        ("warning", "Omitidos", percent(summary.skipped, summary.total)),
    ];

    let mut bar = String::new();
    let mut legend = String::new();
    for (class, label, pct) in segments {
        let _ = write!(
            bar,
            "<div class=\"progress-segment {class}\" style=\"width: {pct:.1}%\"></div>"
        );
        let _ = write!(
            legend,
            "<div class=\"legend-item\"><span class=\"legend-color {class}\"></span><span>{label} ({pct:.1}%)</span></div>"
        );
    }

    format!(
        "<div class=\"chart-container\">\n  <div class=\"chart-title\">Distribución de Resultados</div>\n  <div class=\"progress-bar\">{bar}</div>\n  <div class=\"chart-legend\">{legend}</div>\n</div>"
    )
}

fn test_details(results: &[TestResultEntry]) -> String {
    if results.is_empty() {
        return "<p class=\"no-results\">No hay resultados de tests disponibles.</p>".to_string();
    }

    let mut html = String::new();
    for (index, test) in results.iter().enumerate() {
        let status = test.status.as_str();
        let title = if test.title.trim().is_empty() {
            format!("Test {}", index + 1)
        } else {
            escape_html(&test.title)
        };
        let _ = write!(
            html,
            "<div class=\"test-case-detail {status}\">\n  <div class=\"test-header\">\n    <div class=\"test-number\">{}</div>\n    <div class=\"test-info\">\n      <h4>{title}</h4>\n      <div class=\"test-meta\"><span class=\"test-status {status}\">{status}</span><span class=\"test-duration\">{}ms</span><span class=\"test-file\">{}</span></div>\n    </div>\n  </div>\n",
            index + 1,
            test.duration,
            escape_html(test.file.as_deref().unwrap_or("N/A")),
        );

        if let Some(error) = &test.error {
            let _ = write!(
                html,
                "  <div class=\"test-error\"><h5>Error:</h5><pre>{}</pre></div>\n",
                escape_html(error)
            );
        }

        if !test.steps.is_empty() {
            html.push_str("  <div class=\"test-steps\"><h5>Pasos ejecutados:</h5><ol>");
            for step in &test.steps {
                let _ = write!(html, "<li>{}</li>", escape_html(step));
            }
            html.push_str("</ol></div>\n");
        }
        html.push_str("</div>\n");
    }
    html
}

fn recommendation_blocks(recommendations: &[Recommendation]) -> String {
    recommendations
        .iter()
        .map(|rec| {
            format!(
                "<div class=\"recommendation {}\"><h4>{}</h4><p>{}</p></div>",
                rec.severity.css_class(),
                escape_html(&rec.title),
                escape_html(&rec.message)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Executive report page; expects `styles.css` alongside it.
pub fn render(report: &Report, recommendations: &[Recommendation]) -> String {
    let project = escape_html(&report.project_name);
    let timestamp = display_timestamp(&report.timestamp);

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Reporte Ejecutivo - {project}</title>
    <link rel="stylesheet" href="styles.css">
</head>
<body>
    <div class="container">
        <header class="report-header">
            <h1>📊 Reporte Ejecutivo de Tests</h1>
            <h2>{project}</h2>
            <p class="timestamp">Generado el {timestamp}</p>
        </header>
        <main class="report-content">
            <section class="summary-section">
                <h3>📈 Resumen Ejecutivo</h3>
                {cards}
            </section>
            <section class="chart-section">
                {chart}
            </section>
            <section class="details-section">
                <h3>🔍 Detalles de Tests</h3>
                <div class="test-cases">
{details}
                </div>
            </section>
            <section class="recommendations-section">
                <h3>💡 Recomendaciones</h3>
                <div class="recommendations">
{recommendations}
                </div>
            </section>
        </main>
        <footer class="report-footer">
            <p>Generado automáticamente por testforge</p>
            <p class="timestamp">{timestamp}</p>
        </footer>
    </div>
</body>
</html>
"#,
        project = project,
        timestamp = timestamp,
        cards = summary_cards(&report.summary),
        chart = execution_chart(&report.summary),
        details = test_details(&report.test_results),
        recommendations = recommendation_blocks(recommendations),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::{ExecutionStats, TestStatus};
    use crate::domain::validation::Severity;

    fn sample_report() -> Report {
        Report {
            project_name: "casos<login>".to_string(),
            timestamp: "2026-03-01T10:00:00Z".to_string(),
            execution_stats: ExecutionStats {
                passed: 1,
                failed: 1,
                skipped: 0,
                total_time: 900,
            },
            test_results: vec![TestResultEntry {
                title: "Login".to_string(),
                file: None,
                status: TestStatus::Failed,
                duration: 450,
                error: Some("expected <div>".to_string()),
                steps: vec!["page.goto".to_string()],
            }],
            summary: ReportSummary {
                total: 2,
                passed: 1,
                failed: 1,
                skipped: 0,
                success_rate: 0.5,
                total_time: 450,
                avg_duration: 225.0,
            },
        }
    }

    #[test]
    fn test_render_contains_sections_and_escapes() {
        let recommendations = vec![Recommendation {
            severity: Severity::Error,
            title: "Tests Fallidos".to_string(),
            message: "Revisa".to_string(),
        }];
        let html = render(&sample_report(), &recommendations);

        assert!(html.contains("casos&lt;login&gt;"));
        assert!(html.contains("expected &lt;div&gt;"));
        assert!(html.contains("style=\"width: 50.0%\""));
        assert!(html.contains("<li>page.goto</li>"));
        assert!(html.contains("recommendation error"));
        assert!(html.contains("N/A"));
    }

    #[test]
    fn test_empty_results_placeholder() {
        let mut report = sample_report();
        report.test_results.clear();
        assert!(render(&report, &[]).contains("No hay resultados de tests disponibles"));
    }
}
