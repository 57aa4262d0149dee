//! Which sheets, rows and columns an import scans

use crate::error::BridgeResult;
use crate::types::{column_index, column_letter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scan settings for an import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub start_row: u32,
    /// Defaults to the sheet's highest populated row
    pub end_row: Option<u32>,
    pub start_column: String,
    /// Defaults to the sheet's highest populated column
    pub end_column: Option<String>,
    /// Explicit rows, read as given; overrides the row range
    pub rows: Vec<u32>,
    /// Explicit columns, read as given; overrides the column range
    pub columns: Vec<String>,
    /// Column letter → record field; unmapped columns use their letter
    pub column_fields: HashMap<String, String>,
    pub sheet_indices: Vec<usize>,
    pub sheet_names: Vec<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            start_row: 1,
            end_row: None,
            start_column: "A".to_string(),
            end_column: None,
            rows: Vec::new(),
            columns: Vec::new(),
            column_fields: HashMap::new(),
            sheet_indices: Vec::new(),
            sheet_names: Vec::new(),
        }
    }
}

impl ImportOptions {
    /// Record field for a (normalized) column letter
    pub fn field_for(&self, letter: &str) -> String {
        self.column_fields
            .get(letter)
            .cloned()
            .unwrap_or_else(|| letter.to_string())
    }
}

/// A column to scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanColumn {
    pub index: u32,
    pub letter: String,
}

impl ScanColumn {
    fn at(index: u32) -> Self {
        Self {
            index,
            letter: column_letter(index),
        }
    }
}

/// Rows to read: the explicit list verbatim, else `start_row..=end`
pub fn resolve_rows(options: &ImportOptions, highest_row: u32) -> Vec<u32> {
    if !options.rows.is_empty() {
        return options.rows.clone();
    }

    let end = options.end_row.filter(|&r| r > 0).unwrap_or(highest_row);
    (options.start_row.max(1)..=end).collect()
}

/// Columns to read: the explicit list verbatim, else `start_column..=end`
pub fn resolve_columns(
    options: &ImportOptions,
    highest_column: u32,
) -> BridgeResult<Vec<ScanColumn>> {
    if !options.columns.is_empty() {
        return options
            .columns
            .iter()
            .map(|c| column_index(c).map(ScanColumn::at))
            .collect();
    }

    let start = column_index(&options.start_column)?;
    let end = match options.end_column.as_deref() {
        Some(letters) if !letters.trim().is_empty() => column_index(letters)?,
        _ => highest_column,
    };

    Ok((start..=end).map(ScanColumn::at).collect())
}

/// Sheet indices to read, given the document's sheet names
///
/// With no constraint every sheet is read. Indices alone are filtered to
/// existing sheets in the given order; names alone select matching sheets in
/// document order. With both, the two selections are unioned.
pub fn resolve_sheet_indices(options: &ImportOptions, names: &[String]) -> Vec<usize> {
    let all: Vec<usize> = (0..names.len()).collect();

    if options.sheet_indices.is_empty() && options.sheet_names.is_empty() {
        return all;
    }

    let by_index: Vec<usize> = if options.sheet_indices.is_empty() {
        all
    } else {
        options
            .sheet_indices
            .iter()
            .copied()
            .filter(|&i| i < names.len())
            .collect()
    };

    if options.sheet_names.is_empty() {
        return by_index;
    }

    let by_name: Vec<usize> = names
        .iter()
        .enumerate()
        .filter(|(_, name)| options.sheet_names.contains(name))
        .map(|(i, _)| i)
        .collect();

    if options.sheet_indices.is_empty() {
        return by_index
            .into_iter()
            .filter(|i| by_name.contains(i))
            .collect();
    }

    let mut union = Vec::with_capacity(by_index.len() + by_name.len());
    for index in by_index.into_iter().chain(by_name) {
        if !union.contains(&index) {
            union.push(index);
        }
    }
    union
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names() -> Vec<String> {
        vec!["Sheet1".to_string(), "Sheet2".to_string(), "Sheet3".to_string()]
    }

    fn letters(columns: &[ScanColumn]) -> Vec<&str> {
        columns.iter().map(|c| c.letter.as_str()).collect()
    }

    #[test]
    fn test_rows_default_to_highest_row() {
        let options = ImportOptions {
            start_row: 2,
            ..Default::default()
        };
        assert_eq!(resolve_rows(&options, 5), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_rows_with_end_row() {
        let options = ImportOptions {
            end_row: Some(3),
            ..Default::default()
        };
        assert_eq!(resolve_rows(&options, 100), vec![1, 2, 3]);
    }

    #[test]
    fn test_explicit_rows_are_verbatim() {
        let options = ImportOptions {
            rows: vec![9, 3, 3, 5],
            end_row: Some(2),
            ..Default::default()
        };
        assert_eq!(resolve_rows(&options, 1), vec![9, 3, 3, 5]);
    }

    #[test]
    fn test_empty_sheet_has_no_rows() {
        assert!(resolve_rows(&ImportOptions::default(), 0).is_empty());
    }

    #[test]
    fn test_columns_default_to_highest_column() {
        let options = ImportOptions {
            start_column: "b".to_string(),
            ..Default::default()
        };
        let columns = resolve_columns(&options, 4).unwrap();
        assert_eq!(letters(&columns), vec!["B", "C", "D"]);
    }

    #[test]
    fn test_columns_range_crosses_z() {
        let options = ImportOptions {
            start_column: "Y".to_string(),
            end_column: Some("ab".to_string()),
            ..Default::default()
        };
        let columns = resolve_columns(&options, 1).unwrap();
        assert_eq!(letters(&columns), vec!["Y", "Z", "AA", "AB"]);
        assert_eq!(columns[2].index, 27);
    }

    #[test]
    fn test_explicit_columns_are_normalized() {
        let options = ImportOptions {
            columns: vec!["c".to_string(), "a".to_string()],
            ..Default::default()
        };
        let columns = resolve_columns(&options, 0).unwrap();
        assert_eq!(letters(&columns), vec!["C", "A"]);
    }

    #[test]
    fn test_invalid_column_is_an_error() {
        let options = ImportOptions {
            columns: vec!["1".to_string()],
            ..Default::default()
        };
        assert!(resolve_columns(&options, 0).is_err());
    }

    #[test]
    fn test_all_sheets_without_constraints() {
        assert_eq!(resolve_sheet_indices(&ImportOptions::default(), &names()), vec![0, 1, 2]);
    }

    #[test]
    fn test_indices_only() {
        let options = ImportOptions {
            sheet_indices: vec![2, 7, 0],
            ..Default::default()
        };
        assert_eq!(resolve_sheet_indices(&options, &names()), vec![2, 0]);
    }

    #[test]
    fn test_names_only() {
        let options = ImportOptions {
            sheet_names: vec!["Sheet3".to_string(), "Missing".to_string(), "Sheet1".to_string()],
            ..Default::default()
        };
        assert_eq!(resolve_sheet_indices(&options, &names()), vec![0, 2]);
    }

    #[test]
    fn test_indices_and_names_are_unioned() {
        let options = ImportOptions {
            sheet_indices: vec![0],
            sheet_names: vec!["Sheet2".to_string()],
            ..Default::default()
        };
        assert_eq!(resolve_sheet_indices(&options, &names()), vec![0, 1]);
    }

    #[test]
    fn test_union_drops_duplicates() {
        let options = ImportOptions {
            sheet_indices: vec![1, 0],
            sheet_names: vec!["Sheet1".to_string(), "Sheet3".to_string()],
            ..Default::default()
        };
        assert_eq!(resolve_sheet_indices(&options, &names()), vec![1, 0, 2]);
    }

    #[test]
    fn test_field_for_column() {
        let mut options = ImportOptions::default();
        options
            .column_fields
            .insert("A".to_string(), "name".to_string());
        assert_eq!(options.field_for("A"), "name");
        assert_eq!(options.field_for("B"), "B");
    }
}
