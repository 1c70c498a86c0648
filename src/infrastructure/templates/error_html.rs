use super::{display_timestamp, escape_html};

/// Page written when the test run could not produce results.
pub fn render(project_name: &str, timestamp: &str, error_message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <title>Reporte de Error - {project}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; }}
        .header {{ background: #f44336; color: white; padding: 20px; }}
        .error {{ background: #ffebee; padding: 15px; border-radius: 4px; }}
        pre {{ white-space: pre-wrap; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>Error en Ejecución de Tests</h1>
        <p>Proyecto: {project}</p>
        <p>Fecha: {timestamp}</p>
    </div>
    <div class="error">
        <h2>Error Encontrado:</h2>
        <pre>{error}</pre>
    </div>
</body>
</html>
"#,
        project = escape_html(project_name),
        timestamp = display_timestamp(timestamp),
        error = escape_html(error_message),
    )
}
