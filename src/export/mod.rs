//! Export: title trees + records → xlsx/csv
//!
//! Titles are resolved into a header layout, records are written beneath
//! it through the value resolution chain in [`format`], and the populated
//! document is serialized once at the end.

mod exporter;
mod format;
mod path;

pub use exporter::{ExportConfig, Exporter, SavedFile};
pub use format::{
    CellCallback, CellContext, CellSource, DefaultFormat, FieldFormat, FormatContext, Record,
    RecordValue, SheetData,
};
pub use path::{resolve_dir, resolve_file_name, DatePath, ExportType};
