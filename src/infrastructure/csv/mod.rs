// ============================================================
// TABULAR INFRASTRUCTURE LAYER
// ============================================================
// CSV and spreadsheet readers producing a TabularSheet

mod csv_parser;
mod spreadsheet;

pub use csv_parser::CsvParser;
pub use spreadsheet::SpreadsheetReader;

use std::path::Path;

use crate::domain::csv::TabularSheet;
use crate::domain::error::{AppError, Result};

/// File extensions the watcher hands to the pipeline.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["csv", "xlsx", "xls", "ods"];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Reads any supported input file, choosing the reader by extension.
pub fn read_sheet(path: &Path) -> Result<TabularSheet> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => CsvParser::parse_file_auto_detect(path),
        "xlsx" | "xls" | "ods" => SpreadsheetReader::read_first_sheet(path),
        other => Err(AppError::ParseError(format!(
            "Unsupported input extension '{}': {}",
            other,
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        assert!(is_supported(Path::new("IN/casos.csv")));
        assert!(is_supported(Path::new("IN/casos.XLSX")));
        assert!(is_supported(Path::new("casos.ods")));
        assert!(!is_supported(Path::new("casos.txt")));
        assert!(!is_supported(Path::new("casos")));
    }

    #[test]
    fn test_read_sheet_rejects_unknown_extension() {
        let err = read_sheet(Path::new("notes.md")).unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }
}
