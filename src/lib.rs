//! Sheetbridge - records to spreadsheets and back
//!
//! Export writes sheets of records under nested, merged column headers with
//! per-field styling and formatting. Import reads a cell range of a
//! spreadsheet back into field-keyed records.
//!
//! # Features
//!
//! - Title trees of any depth resolved into header cells and merge ranges
//! - Per-record cell callbacks, per-field formatters and a default formatter
//! - Column width, font color and alignment per field
//! - `.xlsx` and `.csv` output, dated output directories
//! - Import from `.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods` and `.csv`
//!
//! # Example
//!
//! ```no_run
//! use sheetbridge::export::{DatePath, Exporter, Record, SheetData};
//! use sheetbridge::import::Importer;
//! use sheetbridge::title::{SheetTitle, TitleNode};
//!
//! let titles = SheetTitle::new(vec![
//!     TitleNode::leaf("id", "ID"),
//!     TitleNode::group("info", "User", vec![TitleNode::leaf("name", "Name")]),
//! ]);
//! let records = vec![Record::new().set("id", 1).set("name", "alice")];
//!
//! let saved = Exporter::new(vec![SheetData::new("users", records)])
//!     .titles(vec![titles])
//!     .xlsx()
//!     .save("out", &DatePath::Today, Some("users"))?;
//!
//! let sheets = Importer::new(saved.full_path()).start_row(3).data()?;
//! println!("Imported {} records", sheets[0].records.len());
//! # Ok::<(), sheetbridge::error::BridgeError>(())
//! ```

pub mod cli;
pub mod document;
pub mod error;
pub mod export;
pub mod import;
pub mod render;
pub mod title;
pub mod types;

// Re-export commonly used types
pub use error::{BridgeError, BridgeResult};
pub use export::{ExportType, Exporter, Record, SheetData};
pub use import::{ImportOptions, Importer};
pub use title::{SheetTitle, TitleNode};
pub use types::{CellRef, CellValue, MergeRange};
