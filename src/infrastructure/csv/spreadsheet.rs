// ============================================================
// SPREADSHEET READER
// ============================================================
// XLSX / XLS / ODS input via calamine (first worksheet only)

use std::path::Path;

use calamine::{open_workbook_auto, Reader};

use crate::domain::csv::TabularSheet;
use crate::domain::error::{AppError, Result};

pub struct SpreadsheetReader;

impl SpreadsheetReader {
    /// First row is the header row; remaining rows are data.
    pub fn read_first_sheet(path: &Path) -> Result<TabularSheet> {
        let mut workbook = open_workbook_auto(path).map_err(|e| {
            AppError::ParseError(format!("Failed to open workbook {}: {}", path.display(), e))
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| {
                AppError::ParseError(format!("Workbook has no worksheets: {}", path.display()))
            })?
            .map_err(|e| AppError::ParseError(format!("Failed to read worksheet: {}", e)))?;

        let mut grid = range.rows().map(|row| {
            row.iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect::<Vec<String>>()
        });

        let headers: Vec<String> = grid
            .next()
            .ok_or_else(|| AppError::ParseError("Worksheet is empty".to_string()))?;
        let cells: Vec<Vec<String>> = grid.collect();

        Ok(TabularSheet::from_grid(headers, cells))
    }
}
