//! In-memory workbook the exporter populates and the importer reads into
//!
//! Every cell is staged here first; serialization to a file format happens
//! once, at the end, in [`crate::render`].

use crate::error::{BridgeError, BridgeResult};
use crate::types::{CellRef, CellValue, HorizontalAlign, MergeRange, VerticalAlign};
use std::collections::BTreeMap;

/// Default font size applied to every cell of an exported workbook
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

//==============================================================================
// Styles
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    /// 0xRRGGBB
    pub font_color: Option<u32>,
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
}

impl CellStyle {
    pub fn aligned(horizontal: HorizontalAlign, vertical: VerticalAlign) -> Self {
        Self {
            font_color: None,
            horizontal: Some(horizontal),
            vertical: Some(vertical),
        }
    }
}

/// Parse `#RRGGBB` or `RRGGBB` into 0xRRGGBB
pub fn parse_color(color: &str) -> BridgeResult<u32> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(BridgeError::Style(format!("Invalid color '{}'", color)));
    }
    u32::from_str_radix(hex, 16)
        .map_err(|_| BridgeError::Style(format!("Invalid color '{}'", color)))
}

//==============================================================================
// Cells and Sheets
//==============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<CellRef, Cell>,
    merges: Vec<MergeRange>,
    column_widths: BTreeMap<u32, f64>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn cell(&self, cell: CellRef) -> Option<&Cell> {
        self.cells.get(&cell)
    }

    /// Value at `cell`; missing cells read as [`CellValue::Empty`]
    pub fn value(&self, cell: CellRef) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(&cell).map(|c| &c.value).unwrap_or(&EMPTY)
    }

    pub fn set_value(&mut self, cell: CellRef, value: CellValue) {
        self.cells.entry(cell).or_default().value = value;
    }

    pub fn set_style(&mut self, cell: CellRef, style: CellStyle) {
        self.cells.entry(cell).or_default().style = style;
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        let mut cells: Vec<_> = self.cells.iter().map(|(k, v)| (*k, v)).collect();
        cells.sort_by_key(|(k, _)| (k.row, k.column));
        cells.into_iter()
    }

    /// Register a merged block; single cells and repeats are ignored
    pub fn merge(&mut self, range: MergeRange) -> BridgeResult<()> {
        if range.start_column == 0 || range.start_row == 0 {
            return Err(BridgeError::Merge(format!(
                "Merge range {:?} must be 1-based",
                range
            )));
        }
        if range.is_single_cell() || self.merges.contains(&range) {
            return Ok(());
        }
        if let Some(existing) = self.merges.iter().find(|m| m.overlaps(&range)) {
            return Err(BridgeError::Merge(format!(
                "{} overlaps existing merge {} on sheet '{}'",
                range, existing, self.name
            )));
        }
        self.merges.push(range);
        Ok(())
    }

    pub fn merges(&self) -> &[MergeRange] {
        &self.merges
    }

    pub fn merged_range_at(&self, cell: CellRef) -> Option<&MergeRange> {
        self.merges.iter().find(|m| m.contains(cell))
    }

    pub fn set_column_width(&mut self, column: u32, width: f64) {
        self.column_widths.insert(column, width);
    }

    pub fn column_width(&self, column: u32) -> Option<f64> {
        self.column_widths.get(&column).copied()
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.column_widths.iter().map(|(c, w)| (*c, *w))
    }

    /// Highest row holding a non-empty value, 0 for an empty sheet
    pub fn highest_row(&self) -> u32 {
        self.cells
            .iter()
            .filter(|(_, c)| !c.value.is_empty())
            .map(|(k, _)| k.row)
            .max()
            .unwrap_or(0)
    }

    /// Highest column holding a non-empty value, 0 for an empty sheet
    pub fn highest_column(&self) -> u32 {
        self.cells
            .iter()
            .filter(|(_, c)| !c.value.is_empty())
            .map(|(k, _)| k.column)
            .max()
            .unwrap_or(0)
    }
}

//==============================================================================
// Workbook
//==============================================================================

#[derive(Debug, Clone)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
    font_size: f64,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// A workbook with one default sheet, like a freshly created document
    pub fn new() -> Self {
        Self {
            sheets: vec![Worksheet::new("Sheet1")],
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// A workbook holding exactly the given sheets
    pub fn from_sheets(sheets: Vec<Worksheet>) -> Self {
        Self {
            sheets,
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn sheet(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// Sheet at `index`, creating it and any missing sheets before it
    pub fn sheet_mut_or_create(&mut self, index: usize) -> &mut Worksheet {
        while self.sheets.len() <= index {
            let name = format!("Sheet{}", self.sheets.len() + 1);
            self.sheets.push(Worksheet::new(name));
        }
        &mut self.sheets[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#0000ff").unwrap(), 0x0000FF);
        assert_eq!(parse_color("FF0000").unwrap(), 0xFF0000);
        assert!(matches!(parse_color("#12345"), Err(BridgeError::Style(_))));
        assert!(matches!(parse_color("#GGGGGG"), Err(BridgeError::Style(_))));
    }

    #[test]
    fn test_highest_row_and_column_ignore_styled_blanks() {
        let mut sheet = Worksheet::new("data");
        sheet.set_value(CellRef::new(2, 3), CellValue::from("x"));
        sheet.set_style(CellRef::new(5, 9), CellStyle::default());
        assert_eq!(sheet.highest_row(), 3);
        assert_eq!(sheet.highest_column(), 2);
    }

    #[test]
    fn test_empty_sheet_extent() {
        let sheet = Worksheet::new("empty");
        assert_eq!(sheet.highest_row(), 0);
        assert_eq!(sheet.highest_column(), 0);
        assert_eq!(sheet.value(CellRef::new(1, 1)), &CellValue::Empty);
    }

    #[test]
    fn test_merge_rejects_overlap() {
        let mut sheet = Worksheet::new("data");
        sheet.merge(MergeRange::new(1, 1, 2, 1)).unwrap();
        let err = sheet.merge(MergeRange::new(2, 1, 2, 2)).unwrap_err();
        assert!(matches!(err, BridgeError::Merge(_)));
        // Single cells are not merges
        sheet.merge(MergeRange::new(1, 1, 1, 1)).unwrap();
        assert_eq!(sheet.merges().len(), 1);
    }

    #[test]
    fn test_value_and_style_are_independent() {
        let mut sheet = Worksheet::new("data");
        let cell = CellRef::new(1, 1);
        sheet.set_style(cell, CellStyle::aligned(HorizontalAlign::Right, VerticalAlign::Top));
        sheet.set_value(cell, CellValue::from(4));
        let stored = sheet.cell(cell).unwrap();
        assert_eq!(stored.value, CellValue::Number(4.0));
        assert_eq!(stored.style.horizontal, Some(HorizontalAlign::Right));
    }

    #[test]
    fn test_sheets_created_in_order() {
        let mut workbook = Workbook::new();
        workbook.sheet_mut_or_create(2).set_name("third");
        assert_eq!(workbook.sheet_names(), vec!["Sheet1", "Sheet2", "third"]);
    }

    #[test]
    fn test_cells_iterate_row_major() {
        let mut sheet = Worksheet::new("data");
        sheet.set_value(CellRef::new(1, 2), CellValue::from("a2"));
        sheet.set_value(CellRef::new(2, 1), CellValue::from("b1"));
        let order: Vec<String> = sheet.cells().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, vec!["B1", "A2"]);
    }
}
