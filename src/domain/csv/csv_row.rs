// ============================================================
// RAW ROW TYPES
// ============================================================
// Header/value pairs exactly as they appear in the input sheet

use serde::{Deserialize, Serialize};

/// A single cell, keyed by its original header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CsvField {
    /// Header text as written in the sheet (may carry accents)
    pub name: String,

    /// Cell value
    pub value: String,
}

impl CsvField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// One input row. Discarded once normalized into a `TestCase`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawRecord {
    /// Row index (0-based, header excluded)
    pub index: usize,

    /// Cells in header order
    pub fields: Vec<CsvField>,
}

impl RawRecord {
    pub fn new(index: usize, fields: Vec<CsvField>) -> Self {
        Self { index, fields }
    }

    /// Builds a record from `(header, value)` pairs.
    #[cfg(test)]
    pub fn from_pairs<K, V>(index: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(name, value)| CsvField::new(name, value))
            .collect();
        Self { index, fields }
    }

    /// A row where every cell is blank carries no test case.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(CsvField::is_empty)
    }
}

/// A parsed sheet: the header row plus its data rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabularSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl TabularSheet {
    /// Pairs each row of `cells` with `headers`; short rows are padded with empty values.
    pub fn from_grid(headers: Vec<String>, cells: Vec<Vec<String>>) -> Self {
        let rows = cells
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                let fields = headers
                    .iter()
                    .enumerate()
                    .map(|(col, header)| {
                        CsvField::new(header.clone(), row.get(col).cloned().unwrap_or_default())
                    })
                    .collect();
                RawRecord::new(index, fields)
            })
            .filter(|record: &RawRecord| !record.is_blank())
            .collect::<Vec<_>>();

        // Re-number after dropping blank rows so indexes stay contiguous.
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, record)| RawRecord::new(index, record.fields))
            .collect();

        Self { headers, rows }
    }
}
