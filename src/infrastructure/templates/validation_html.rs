use std::fmt::Write;

use super::{display_timestamp, escape_html};
use crate::domain::validation::ValidationReport;

fn issue_list(title: &str, class: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut html = format!("<div class=\"issues {class}\"><h3>{title} ({})</h3><ul>", items.len());
    for item in items {
        let _ = write!(html, "<li>{}</li>", escape_html(item));
    }
    html.push_str("</ul></div>");
    html
}

/// Validation summary for one input file.
pub fn render(project_name: &str, report: &ValidationReport) -> String {
    let result = &report.result;
    let (status_class, status_label) = if result.is_valid {
        ("success", "✅ Válido")
    } else {
        ("error", "❌ Con errores")
    };

    let recommendations: String = report
        .recommendations
        .iter()
        .map(|rec| {
            format!(
                "<div class=\"recommendation {}\"><h4>{}</h4><p>{}</p><p class=\"action\">👉 {}</p></div>",
                rec.severity.css_class(),
                escape_html(&rec.title),
                escape_html(&rec.message),
                escape_html(&rec.action)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <title>Validación CSV - {project}</title>
    <style>
        body {{ font-family: 'Segoe UI', Arial, sans-serif; margin: 20px; color: #333; }}
        .header {{ background: #3f51b5; color: white; padding: 20px; border-radius: 8px; }}
        .cards {{ display: flex; gap: 15px; margin: 20px 0; }}
        .card {{ flex: 1; padding: 15px; border-radius: 8px; background: #f5f5f5; text-align: center; }}
        .card.success {{ background: #e8f5e9; }}
        .card.error {{ background: #ffebee; }}
        .issues {{ margin: 15px 0; padding: 15px; border-radius: 8px; }}
        .issues.error {{ background: #ffebee; }}
        .issues.warning {{ background: #fff8e1; }}
        .recommendation {{ border-left: 5px solid #2196F3; padding: 10px 15px; margin: 10px 0; background: #fafafa; }}
        .recommendation.error {{ border-color: #f44336; }}
        .recommendation.warning {{ border-color: #ff9800; }}
        .recommendation.success {{ border-color: #4caf50; }}
        .action {{ font-style: italic; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>📋 Reporte de Validación</h1>
        <p>Proyecto: {project}</p>
        <p>Generado: {timestamp}</p>
    </div>
    <div class="cards">
        <div class="card {status_class}"><h2>{status_label}</h2><p>Estado</p></div>
        <div class="card"><h2>{valid_rows}/{total_rows}</h2><p>Filas válidas</p></div>
        <div class="card"><h2>{errors}</h2><p>Errores</p></div>
        <div class="card"><h2>{warnings}</h2><p>Advertencias</p></div>
    </div>
    {error_list}
    {warning_list}
    <h2>💡 Recomendaciones</h2>
    {recommendations}
</body>
</html>
"#,
        project = escape_html(project_name),
        timestamp = display_timestamp(&report.timestamp),
        status_class = status_class,
        status_label = status_label,
        valid_rows = result.valid_rows,
        total_rows = result.total_rows,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        error_list = issue_list("Errores", "error", &result.errors),
        warning_list = issue_list("Advertencias", "warning", &result.warnings),
        recommendations = recommendations,
    )
}
