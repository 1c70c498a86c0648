//! HTML renderers for the files written under a project's `reports/` folder.
//! Pure string building; callers own the I/O.

pub mod error_html;
pub mod report_html;
pub mod validation_html;

/// Stylesheet shipped next to the executive report.
pub const REPORT_CSS: &str = include_str!("styles.css");

/// Escapes text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Renders an RFC 3339 timestamp for humans; unparseable input is shown as is.
pub fn display_timestamp(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%d/%m/%Y %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|_| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("Descripción"), "Descripción");
    }

    #[test]
    fn test_display_timestamp_fallback() {
        assert_eq!(display_timestamp("ayer"), "ayer");
        assert!(display_timestamp("2026-01-02T03:04:05Z").contains("/2026"));
    }
}
