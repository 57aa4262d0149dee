//! Exporter: titles + records → spreadsheet file

use super::format::{CellContext, CellSource, DefaultFormat, FormatContext, Record, SheetData};
use super::path::{resolve_dir, resolve_file_name, DatePath, ExportType};
use crate::document::{parse_color, CellStyle, Workbook, Worksheet, DEFAULT_FONT_SIZE};
use crate::error::BridgeResult;
use crate::render;
use crate::title::{resolve_all, ResolvedTitle, ResolvedTitles, SheetTitle};
use crate::types::{CellRef, CellValue, HorizontalAlign, MergeRange, VerticalAlign};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Exporter-wide settings
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Used when the requested type is unknown or not enabled
    pub default_type: ExportType,
    pub enabled_types: Vec<ExportType>,
    pub font_size: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_type: ExportType::Xlsx,
            enabled_types: vec![ExportType::Xlsx, ExportType::Csv],
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Where a saved export landed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    /// Directory holding the file
    pub path: PathBuf,
    pub filename: String,
}

impl SavedFile {
    pub fn full_path(&self) -> PathBuf {
        self.path.join(&self.filename)
    }
}

/// Writes sheets of records under nested, merged headers
#[derive(Debug, Default)]
pub struct Exporter {
    sheets: Vec<SheetData>,
    titles: Vec<SheetTitle>,
    merges: BTreeMap<usize, Vec<MergeRange>>,
    requested_type: String,
    config: ExportConfig,
    default_format: DefaultFormat,
    document: Option<Workbook>,
}

impl Exporter {
    pub fn new(sheets: Vec<SheetData>) -> Self {
        Self {
            sheets,
            requested_type: ExportType::Xlsx.to_string(),
            ..Default::default()
        }
    }

    /// Request a file type by name (case-insensitive)
    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.requested_type = kind.into();
        self
    }

    pub fn xlsx(self) -> Self {
        self.with_type("xlsx")
    }

    pub fn xls(self) -> Self {
        self.with_type("xls")
    }

    pub fn csv(self) -> Self {
        self.with_type("csv")
    }

    pub fn data(mut self, sheets: Vec<SheetData>) -> Self {
        self.sheets = sheets;
        self
    }

    /// Title forests, one per sheet index
    pub fn titles(mut self, titles: Vec<SheetTitle>) -> Self {
        self.titles = titles;
        self
    }

    /// Merge a block of sheet `sheet` before its headers are written
    pub fn add_merge(
        mut self,
        sheet: usize,
        start_column: u32,
        start_row: u32,
        end_column: u32,
        end_row: u32,
    ) -> Self {
        self.merges
            .entry(sheet)
            .or_default()
            .push(MergeRange::new(start_column, start_row, end_column, end_row));
        self
    }

    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_default_format(mut self, format: DefaultFormat) -> Self {
        self.default_format = format;
        self
    }

    /// The type that will be written; unknown or disabled requests fall back
    pub fn export_type(&self) -> ExportType {
        match ExportType::parse(&self.requested_type) {
            Some(kind) if self.config.enabled_types.contains(&kind) => kind,
            _ => {
                warn!(
                    requested = %self.requested_type,
                    fallback = %self.config.default_type,
                    "Export type not enabled; using default"
                );
                self.config.default_type
            }
        }
    }

    pub fn resolved_titles(&self) -> Vec<ResolvedTitles> {
        resolve_all(&self.titles)
    }

    /// The in-memory document, created on first access
    pub fn document_mut(&mut self) -> &mut Workbook {
        let font_size = self.config.font_size;
        self.document.get_or_insert_with(|| new_document(font_size))
    }

    pub fn document(&mut self) -> &Workbook {
        self.document_mut()
    }

    /// Write every sheet's merges, headers and records into the document
    pub fn populate(&mut self) -> BridgeResult<()> {
        let titles = self.resolved_titles();
        let no_titles = ResolvedTitles::empty();

        let Exporter {
            sheets,
            merges,
            config,
            default_format,
            document,
            ..
        } = self;
        let sheets: &[SheetData] = sheets;
        let document = document.get_or_insert_with(|| new_document(config.font_size));

        for (index, data) in sheets.iter().enumerate() {
            let worksheet = document.sheet_mut_or_create(index);

            for range in merges.get(&index).into_iter().flatten() {
                worksheet.merge(*range)?;
            }
            worksheet.set_name(data.name.clone());

            let layout = titles.get(index).unwrap_or(&no_titles);
            write_headers(worksheet, layout)?;
            write_records(worksheet, layout, data, sheets, default_format)?;

            debug!(
                sheet = %data.name,
                header_rows = layout.header_rows(),
                records = data.records.len(),
                "Populated sheet"
            );
        }

        Ok(())
    }

    /// Populate the document and write it to `root/date_path/file_name.ext`
    pub fn save(
        &mut self,
        root: impl AsRef<Path>,
        date_path: &DatePath,
        file_name: Option<&str>,
    ) -> BridgeResult<SavedFile> {
        let dir = resolve_dir(root.as_ref(), date_path)?;
        let kind = self.export_type();
        let filename = resolve_file_name(file_name, kind);

        self.populate()?;

        let target = dir.join(&filename);
        render::save(self.document(), kind, &target)?;
        info!(path = %target.display(), "Export written");

        Ok(SavedFile {
            path: dir,
            filename,
        })
    }
}

fn new_document(font_size: f64) -> Workbook {
    let mut workbook = Workbook::new();
    workbook.set_font_size(font_size);
    workbook
}

fn write_headers(worksheet: &mut Worksheet, layout: &ResolvedTitles) -> BridgeResult<()> {
    let style = CellStyle::aligned(HorizontalAlign::Center, VerticalAlign::Center);

    for entry in layout.entries() {
        if let Some(range) = entry.merge {
            worksheet.merge(range)?;
        }
        let anchor = entry.anchor();
        worksheet.set_style(anchor, style);
        worksheet.set_value(anchor, CellValue::Text(entry.name.clone()));
    }

    Ok(())
}

fn write_records(
    worksheet: &mut Worksheet,
    layout: &ResolvedTitles,
    data: &SheetData,
    sheets: &[SheetData],
    default_format: &DefaultFormat,
) -> BridgeResult<()> {
    let mut sized_columns = HashSet::new();
    let mut unknown_fields = HashSet::new();

    for (offset, record) in data.records.iter().enumerate() {
        let row = layout.first_data_row() + offset as u32;

        for (field, value) in record.iter() {
            let Some(title) = layout.leaf(field) else {
                if unknown_fields.insert(field.clone()) {
                    warn!(sheet = %data.name, field = %field, "Field has no title column; skipped");
                }
                continue;
            };

            let cell = CellRef::new(title.column, row);
            apply_style(worksheet, title, cell, &mut sized_columns)?;

            let result = match CellSource::select(value, title) {
                CellSource::RecordOverride(callback) => callback.call(&mut CellContext {
                    cell,
                    sheet: &mut *worksheet,
                    row,
                    column: title.column,
                    record,
                    sheets,
                })?,
                CellSource::FieldFormat(format, raw) => format.call(&mut FormatContext {
                    value: raw,
                    title,
                    cell,
                    sheet: &mut *worksheet,
                    record,
                    sheet_data: data,
                    sheets,
                })?,
                CellSource::Default(raw) => default_format.call(raw, title),
            };

            if let Some(value) = result {
                worksheet.set_value(cell, value);
            }
        }
    }

    Ok(())
}

fn apply_style(
    worksheet: &mut Worksheet,
    title: &ResolvedTitle,
    cell: CellRef,
    sized_columns: &mut HashSet<u32>,
) -> BridgeResult<()> {
    if let Some(width) = title.style.width {
        if sized_columns.insert(title.column) {
            worksheet.set_column_width(title.column, width);
        }
    }

    let font_color = match &title.style.color {
        Some(color) => Some(parse_color(color)?),
        None => None,
    };

    worksheet.set_style(
        cell,
        CellStyle {
            font_color,
            horizontal: Some(title.style.horizontal.unwrap_or(HorizontalAlign::Left)),
            vertical: Some(title.style.vertical.unwrap_or(VerticalAlign::Center)),
        },
    );

    Ok(())
}
