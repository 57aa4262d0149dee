//! Serialize an in-memory [`Workbook`] to disk

use crate::document::{CellStyle, Workbook, Worksheet};
use crate::error::{BridgeError, BridgeResult};
use crate::export::ExportType;
use crate::types::{CellRef, CellValue, HorizontalAlign, VerticalAlign};
use rust_xlsxwriter::{Color, Format, FormatAlign};
use std::path::Path;
use tracing::debug;

/// Write `workbook` to `path` in the given format
pub fn save(workbook: &Workbook, kind: ExportType, path: &Path) -> BridgeResult<()> {
    match kind {
        ExportType::Xlsx => save_xlsx(workbook, path),
        ExportType::Csv => save_csv(workbook, path),
        ExportType::Xls => Err(BridgeError::Document(
            "Writing legacy .xls workbooks is not supported".to_string(),
        )),
    }
}

//==============================================================================
// XLSX
//==============================================================================

fn save_xlsx(workbook: &Workbook, path: &Path) -> BridgeResult<()> {
    let mut book = rust_xlsxwriter::Workbook::new();
    let font_size = workbook.font_size();

    for sheet in workbook.sheets() {
        let worksheet = book.add_worksheet();
        worksheet.set_name(sheet.name())?;

        for (column, width) in sheet.column_widths() {
            worksheet.set_column_width(column_num(column)?, width)?;
        }

        for range in sheet.merges() {
            let style = style_at(sheet, range.anchor());
            worksheet.merge_range(
                row_num(range.start_row)?,
                column_num(range.start_column)?,
                row_num(range.end_row)?,
                column_num(range.end_column)?,
                "",
                &cell_format(&style, font_size),
            )?;
        }

        for (cell, stored) in sheet.cells() {
            // Only the anchor of a merged block carries a value
            if matches!(sheet.merged_range_at(cell), Some(m) if m.anchor() != cell) {
                continue;
            }
            let format = cell_format(&stored.style, font_size);
            write_value(worksheet, cell, &stored.value, &format)?;
        }
    }

    book.save(path)?;
    debug!(path = %path.display(), sheets = workbook.sheets().len(), "Saved xlsx workbook");
    Ok(())
}

fn write_value(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    cell: CellRef,
    value: &CellValue,
    format: &Format,
) -> BridgeResult<()> {
    let row = row_num(cell.row)?;
    let col = column_num(cell.column)?;

    match value {
        CellValue::Empty => {
            worksheet.write_blank(row, col, format)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        CellValue::Text(s) => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
    }
    Ok(())
}

fn style_at(sheet: &Worksheet, cell: CellRef) -> CellStyle {
    sheet.cell(cell).map(|c| c.style).unwrap_or_default()
}

fn cell_format(style: &CellStyle, font_size: f64) -> Format {
    let mut format = Format::new().set_font_size(font_size);

    if let Some(rgb) = style.font_color {
        format = format.set_font_color(Color::RGB(rgb));
    }
    if let Some(align) = style.horizontal {
        format = format.set_align(match align {
            HorizontalAlign::Left => FormatAlign::Left,
            HorizontalAlign::Center => FormatAlign::Center,
            HorizontalAlign::Right => FormatAlign::Right,
        });
    }
    if let Some(align) = style.vertical {
        format = format.set_align(match align {
            VerticalAlign::Top => FormatAlign::Top,
            VerticalAlign::Center => FormatAlign::VerticalCenter,
            VerticalAlign::Bottom => FormatAlign::Bottom,
        });
    }

    format
}

/// 1-based row to the writer's 0-based row
fn row_num(row: u32) -> BridgeResult<u32> {
    row.checked_sub(1)
        .ok_or_else(|| BridgeError::CellReference(format!("row {}", row)))
}

/// 1-based column to the writer's 0-based column
fn column_num(column: u32) -> BridgeResult<u16> {
    column
        .checked_sub(1)
        .and_then(|c| u16::try_from(c).ok())
        .ok_or_else(|| BridgeError::CellReference(format!("column {}", column)))
}

//==============================================================================
// CSV
//==============================================================================

fn save_csv(workbook: &Workbook, path: &Path) -> BridgeResult<()> {
    let mut writer = csv::WriterBuilder::new().flexible(false).from_path(path)?;

    if let Some(sheet) = workbook.sheet(0) {
        if workbook.sheets().len() > 1 {
            debug!(
                sheet = sheet.name(),
                skipped = workbook.sheets().len() - 1,
                "CSV holds a single sheet; writing the first"
            );
        }
        for row in csv_rows(sheet) {
            writer.write_record(&row)?;
        }
    }

    writer.flush()?;
    debug!(path = %path.display(), "Saved csv file");
    Ok(())
}

/// Text grid of a sheet from A1 to its highest populated cell
fn csv_rows(sheet: &Worksheet) -> Vec<Vec<String>> {
    let columns = sheet.highest_column();
    (1..=sheet.highest_row())
        .map(|row| {
            (1..=columns)
                .map(|column| sheet.value(CellRef::new(column, row)).to_string())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MergeRange;
    use tempfile::TempDir;

    fn sample() -> Workbook {
        let mut workbook = Workbook::new();
        let sheet = workbook.sheet_mut_or_create(0);
        sheet.set_name("data");
        sheet.merge(MergeRange::new(1, 1, 2, 1)).unwrap();
        sheet.set_value(CellRef::new(1, 1), CellValue::from("Group"));
        sheet.set_value(CellRef::new(1, 2), CellValue::from("a"));
        sheet.set_value(CellRef::new(2, 2), CellValue::from("b"));
        sheet.set_value(CellRef::new(1, 3), CellValue::from(1));
        sheet.set_value(CellRef::new(2, 3), CellValue::from(2.5));
        sheet.set_column_width(2, 20.0);
        workbook
    }

    #[test]
    fn test_csv_rows() {
        let rows = csv_rows(sample().sheet(0).unwrap());
        assert_eq!(
            rows,
            vec![
                vec!["Group".to_string(), String::new()],
                vec!["a".to_string(), "b".to_string()],
                vec!["1".to_string(), "2.5".to_string()],
            ]
        );
    }

    #[test]
    fn test_save_csv() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.csv");
        save(&sample(), ExportType::Csv, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Group,\na,b\n1,2.5\n");
    }

    #[test]
    fn test_save_xlsx() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.xlsx");
        save(&sample(), ExportType::Xlsx, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_xls_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.xls");
        let err = save(&sample(), ExportType::Xls, &path).unwrap_err();
        assert!(matches!(err, BridgeError::Document(_)));
    }

    #[test]
    fn test_column_num_bounds() {
        assert_eq!(column_num(1).unwrap(), 0);
        assert!(column_num(0).is_err());
        assert!(row_num(0).is_err());
    }
}
