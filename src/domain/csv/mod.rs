// ============================================================
// TABULAR DOMAIN LAYER
// ============================================================
// Raw rows as read from an input sheet, before normalization
// No I/O, no async

mod csv_row;

pub use csv_row::{RawRecord, TabularSheet};
