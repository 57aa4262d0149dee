use crate::error::{BridgeError, BridgeResult};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

//==============================================================================
// Cell Values
//==============================================================================

/// A single cell value as written to or read from a sheet
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integral numbers that fit in an i64 without loss
    fn as_integral(n: f64) -> Option<i64> {
        if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
            Some(n as i64)
        } else {
            None
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Number(n) => match Self::as_integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
            CellValue::Number(n) => match Self::as_integral(*n) {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", n),
            },
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

//==============================================================================
// Column Letters
//==============================================================================

/// Convert a 1-based column index to its letters (1 → A, 26 → Z, 27 → AA)
pub fn column_letter(index: u32) -> String {
    let mut result = String::new();
    let mut n = index;

    while n > 0 {
        let remainder = (n - 1) % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        n = (n - 1) / 26;
    }

    result
}

/// Convert column letters to a 1-based index (A → 1, Z → 26, AA → 27)
///
/// Letters are case-insensitive.
pub fn column_index(letters: &str) -> BridgeResult<u32> {
    let trimmed = letters.trim();
    if trimmed.is_empty() || trimmed.len() > 3 {
        return Err(BridgeError::CellReference(format!(
            "'{}' is not a column",
            letters
        )));
    }

    let mut index: u32 = 0;
    for c in trimmed.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(BridgeError::CellReference(format!(
                "'{}' is not a column",
                letters
            )));
        }
        index = index * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }

    Ok(index)
}

//==============================================================================
// Cell Positions
//==============================================================================

/// A 1-based cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub column: u32,
    pub row: u32,
}

impl CellRef {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Parse an A1-style reference such as `B3` or `aa10`
    pub fn parse(reference: &str) -> BridgeResult<Self> {
        let pattern = Regex::new(r"^([A-Za-z]{1,3})([1-9][0-9]*)$")
            .map_err(|e| BridgeError::CellReference(format!("Regex error: {}", e)))?;

        let captures = pattern
            .captures(reference.trim())
            .ok_or_else(|| BridgeError::CellReference(reference.to_string()))?;

        let column = column_index(&captures[1])?;
        let row = captures[2]
            .parse::<u32>()
            .map_err(|_| BridgeError::CellReference(reference.to_string()))?;

        Ok(Self { column, row })
    }

    pub fn column_letter(&self) -> String {
        column_letter(self.column)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.column), self.row)
    }
}

/// A rectangular block of cells shown as one, corners inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeRange {
    pub start_column: u32,
    pub start_row: u32,
    pub end_column: u32,
    pub end_row: u32,
}

impl MergeRange {
    /// Build a range from two corners in any order
    pub fn new(start_column: u32, start_row: u32, end_column: u32, end_row: u32) -> Self {
        Self {
            start_column: start_column.min(end_column),
            start_row: start_row.min(end_row),
            end_column: start_column.max(end_column),
            end_row: start_row.max(end_row),
        }
    }

    pub fn anchor(&self) -> CellRef {
        CellRef::new(self.start_column, self.start_row)
    }

    pub fn is_single_cell(&self) -> bool {
        self.start_column == self.end_column && self.start_row == self.end_row
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        (self.start_column..=self.end_column).contains(&cell.column)
            && (self.start_row..=self.end_row).contains(&cell.row)
    }

    pub fn overlaps(&self, other: &MergeRange) -> bool {
        self.start_column <= other.end_column
            && other.start_column <= self.end_column
            && self.start_row <= other.end_row
            && other.start_row <= self.end_row
    }

    pub fn width(&self) -> u32 {
        self.end_column - self.start_column + 1
    }

    pub fn height(&self) -> u32 {
        self.end_row - self.start_row + 1
    }
}

impl fmt::Display for MergeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            CellRef::new(self.start_column, self.start_row),
            CellRef::new(self.end_column, self.end_row)
        )
    }
}

//==============================================================================
// Alignment
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

impl HorizontalAlign {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" | "centre" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

impl VerticalAlign {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "top" => Some(Self::Top),
            "center" | "centre" | "middle" => Some(Self::Center),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(2), "B");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
        assert_eq!(column_letter(53), "BA");
        assert_eq!(column_letter(703), "AAA");
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A").unwrap(), 1);
        assert_eq!(column_index("z").unwrap(), 26);
        assert_eq!(column_index("AA").unwrap(), 27);
        assert_eq!(column_index("ab").unwrap(), 28);
        assert_eq!(column_index("AAA").unwrap(), 703);
        assert!(column_index("").is_err());
        assert!(column_index("A1").is_err());
        assert!(column_index("ABCD").is_err());
    }

    #[test]
    fn test_column_conversion_is_inverse() {
        for index in 1..2000 {
            assert_eq!(column_index(&column_letter(index)).unwrap(), index);
        }
    }

    #[test]
    fn test_cell_ref_parse_and_display() {
        let cell = CellRef::parse("b3").unwrap();
        assert_eq!(cell, CellRef::new(2, 3));
        assert_eq!(cell.to_string(), "B3");
        assert_eq!(CellRef::parse("AA10").unwrap(), CellRef::new(27, 10));
        assert!(CellRef::parse("A0").is_err());
        assert!(CellRef::parse("3B").is_err());
    }

    #[test]
    fn test_merge_range_normalizes_corners() {
        let range = MergeRange::new(3, 4, 1, 2);
        assert_eq!(range.to_string(), "A2:C4");
        assert_eq!(range.width(), 3);
        assert_eq!(range.height(), 3);
        assert_eq!(range.anchor(), CellRef::new(1, 2));
    }

    #[test]
    fn test_merge_range_overlap() {
        let a = MergeRange::new(1, 1, 2, 1);
        let b = MergeRange::new(2, 1, 2, 2);
        let c = MergeRange::new(3, 1, 3, 2);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(b.contains(CellRef::new(2, 2)));
        assert!(!b.contains(CellRef::new(1, 2)));
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Bool(true).to_string(), "TRUE");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_cell_value_serde() {
        let values: Vec<CellValue> = serde_json::from_str(r#"[null, true, 1, 2.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                CellValue::Empty,
                CellValue::Bool(true),
                CellValue::Number(1.0),
                CellValue::Number(2.5),
                CellValue::Text("x".to_string()),
            ]
        );
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"[null,true,1,2.5,"x"]"#
        );
    }

    #[test]
    fn test_alignment_parse() {
        assert_eq!(HorizontalAlign::parse("RIGHT"), Some(HorizontalAlign::Right));
        assert_eq!(VerticalAlign::parse("center"), Some(VerticalAlign::Center));
        assert_eq!(HorizontalAlign::parse("sideways"), None);
    }
}
