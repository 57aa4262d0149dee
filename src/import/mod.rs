//! Spreadsheet → records

mod importer;
mod range;

pub use importer::{ImportCell, ImportedRecord, ImportedSheet, Importer, SheetInfo};
pub use range::{resolve_columns, resolve_rows, resolve_sheet_indices, ImportOptions, ScanColumn};
