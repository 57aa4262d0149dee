//! Read a cell range of a spreadsheet into field-keyed records

use super::range::{resolve_columns, resolve_rows, resolve_sheet_indices, ImportOptions};
use crate::document::{Workbook, Worksheet};
use crate::error::{BridgeError, BridgeResult};
use crate::types::{column_letter, CellRef, CellValue};
use calamine::{open_workbook_auto, Data, Range, Reader};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One imported row, keyed by field name in column order
pub type ImportedRecord = IndexMap<String, CellValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedSheet {
    pub sheet_name: String,
    pub records: Vec<ImportedRecord>,
}

/// Name and populated extent of a sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetInfo {
    pub index: usize,
    pub name: String,
    pub highest_row: u32,
    pub highest_column: String,
}

/// What a transform sees for each scanned cell
pub struct ImportCell<'a> {
    pub field: &'a str,
    pub value: CellValue,
    pub cell: CellRef,
    pub sheet: &'a Worksheet,
}

/// Spreadsheet importer
///
/// The document is opened on first use and kept for the importer's
/// lifetime, so several reads of one file parse it once.
#[derive(Debug)]
pub struct Importer {
    path: PathBuf,
    options: ImportOptions,
    document: Option<Workbook>,
}

impl Importer {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options: ImportOptions::default(),
            document: None,
        }
    }

    pub fn with_options(mut self, mut options: ImportOptions) -> Self {
        let fields = std::mem::take(&mut options.column_fields);
        self.options = options;
        self.options.start_row = self.options.start_row.max(1);
        self.column_fields(fields)
    }

    /// First row to read, clamped to 1
    pub fn start_row(mut self, row: u32) -> Self {
        self.options.start_row = row.max(1);
        self
    }

    pub fn end_row(mut self, row: u32) -> Self {
        self.options.end_row = Some(row);
        self
    }

    pub fn start_column(mut self, column: &str) -> Self {
        self.options.start_column = column.trim().to_uppercase();
        self
    }

    pub fn end_column(mut self, column: &str) -> Self {
        self.options.end_column = Some(column.trim().to_uppercase());
        self
    }

    pub fn rows(mut self, rows: Vec<u32>) -> Self {
        self.options.rows = rows;
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.options.columns = columns
            .into_iter()
            .map(|c| c.as_ref().trim().to_uppercase())
            .collect();
        self
    }

    /// Column letter → field name
    pub fn column_fields(mut self, fields: HashMap<String, String>) -> Self {
        self.options.column_fields = fields
            .into_iter()
            .map(|(column, field)| (column.trim().to_uppercase(), field))
            .collect();
        self
    }

    pub fn only_sheet_index(mut self, indices: Vec<usize>) -> Self {
        self.options.sheet_indices = indices;
        self
    }

    pub fn only_sheet_name(mut self, names: Vec<String>) -> Self {
        self.options.sheet_names = names;
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The opened document
    pub fn document(&mut self) -> BridgeResult<&Workbook> {
        let document = load_document(&mut self.document, &self.path)?;
        Ok(document)
    }

    pub fn sheet_names(&mut self) -> BridgeResult<Vec<String>> {
        Ok(self.document()?.sheet_names())
    }

    pub fn sheet_info(&mut self) -> BridgeResult<Vec<SheetInfo>> {
        let document = self.document()?;
        Ok(document
            .sheets()
            .iter()
            .enumerate()
            .map(|(index, sheet)| SheetInfo {
                index,
                name: sheet.name().to_string(),
                highest_row: sheet.highest_row(),
                highest_column: column_letter(sheet.highest_column()),
            })
            .collect())
    }

    /// Records with raw cell values
    pub fn data(&mut self) -> BridgeResult<Vec<ImportedSheet>> {
        self.data_with(|cell| cell.value)
    }

    /// Records with every cell passed through `transform`
    pub fn data_with<F>(&mut self, mut transform: F) -> BridgeResult<Vec<ImportedSheet>>
    where
        F: FnMut(ImportCell<'_>) -> CellValue,
    {
        let document = load_document(&mut self.document, &self.path)?;
        read_sheets(document, &self.options, &mut transform)
    }
}

fn read_sheets<F>(
    document: &Workbook,
    options: &ImportOptions,
    transform: &mut F,
) -> BridgeResult<Vec<ImportedSheet>>
where
    F: FnMut(ImportCell<'_>) -> CellValue,
{
    let indices = resolve_sheet_indices(options, &document.sheet_names());
    let mut result = Vec::with_capacity(indices.len());

    for index in indices {
        let Some(sheet) = document.sheet(index) else {
            continue;
        };

        let rows = resolve_rows(options, sheet.highest_row());
        let columns = resolve_columns(options, sheet.highest_column())?;
        let fields: Vec<String> = columns.iter().map(|c| options.field_for(&c.letter)).collect();

        let mut records = Vec::with_capacity(rows.len());
        for &row in &rows {
            let mut record = ImportedRecord::with_capacity(columns.len());
            for (column, field) in columns.iter().zip(&fields) {
                let cell = CellRef::new(column.index, row);
                let value = transform(ImportCell {
                    field,
                    value: sheet.value(cell).clone(),
                    cell,
                    sheet,
                });
                record.insert(field.clone(), value);
            }
            records.push(record);
        }

        debug!(
            sheet = sheet.name(),
            rows = rows.len(),
            columns = columns.len(),
            "Imported sheet"
        );
        result.push(ImportedSheet {
            sheet_name: sheet.name().to_string(),
            records,
        });
    }

    Ok(result)
}

//==============================================================================
// Loading
//==============================================================================

fn load_document<'a>(slot: &'a mut Option<Workbook>, path: &Path) -> BridgeResult<&'a Workbook> {
    let document = match slot.take() {
        Some(document) => document,
        None => open(path)?,
    };
    Ok(slot.insert(document))
}

fn open(path: &Path) -> BridgeResult<Workbook> {
    if !path.exists() {
        return Err(BridgeError::Document(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let workbook = if is_csv {
        open_csv(path)?
    } else {
        open_spreadsheet(path)?
    };
    debug!(path = %path.display(), sheets = workbook.sheets().len(), "Opened document");
    Ok(workbook)
}

fn open_spreadsheet(path: &Path) -> BridgeResult<Workbook> {
    let mut book = open_workbook_auto(path)?;
    let names = book.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());

    for (index, name) in names.into_iter().enumerate() {
        let mut sheet = Worksheet::new(name);
        if let Some(range) = book.worksheet_range_at(index) {
            fill_sheet(&mut sheet, &range?);
        }
        sheets.push(sheet);
    }

    Ok(Workbook::from_sheets(sheets))
}

fn fill_sheet(sheet: &mut Worksheet, range: &Range<Data>) {
    let (start_row, start_col) = range.start().unwrap_or_default();

    for (row, col, data) in range.used_cells() {
        let value = data_value(data);
        if value.is_empty() {
            continue;
        }
        // Calamine positions are 0-based and relative to the range start
        let cell = CellRef::new(start_col + col as u32 + 1, start_row + row as u32 + 1);
        sheet.set_value(cell, value);
    }
}

/// Computed value of a calamine cell
fn data_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

fn open_csv(path: &Path) -> BridgeResult<Workbook> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut sheet = Worksheet::new("Worksheet");
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (col, field) in record.iter().enumerate() {
            let value = csv_value(field);
            if !value.is_empty() {
                sheet.set_value(CellRef::new(col as u32 + 1, row as u32 + 1), value);
            }
        }
    }

    Ok(Workbook::from_sheets(vec![sheet]))
}

fn csv_value(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    match field.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(field.to_string()),
    }
}
