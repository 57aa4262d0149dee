//! Record data and the per-cell value resolution chain
//!
//! A cell's written value comes from the first applicable source:
//! a computed record value, then the field's format function, then the
//! exporter's default format.

use crate::document::Worksheet;
use crate::error::BridgeResult;
use crate::title::ResolvedTitle;
use crate::types::{CellRef, CellValue};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

//==============================================================================
// Callbacks
//==============================================================================

/// Arguments handed to a computed record value
pub struct CellContext<'a> {
    pub cell: CellRef,
    pub sheet: &'a mut Worksheet,
    pub row: u32,
    pub column: u32,
    pub record: &'a Record,
    pub sheets: &'a [SheetData],
}

/// Arguments handed to a field's format function
pub struct FormatContext<'a> {
    pub value: &'a CellValue,
    pub title: &'a ResolvedTitle,
    pub cell: CellRef,
    pub sheet: &'a mut Worksheet,
    pub record: &'a Record,
    pub sheet_data: &'a SheetData,
    pub sheets: &'a [SheetData],
}

type CellFn = dyn Fn(&mut CellContext<'_>) -> BridgeResult<Option<CellValue>> + Send + Sync;
type FormatFn = dyn Fn(&mut FormatContext<'_>) -> BridgeResult<Option<CellValue>> + Send + Sync;
type DefaultFn = dyn Fn(&CellValue, &ResolvedTitle) -> Option<CellValue> + Send + Sync;

/// A record value computed at write time
///
/// Returning `Ok(None)` leaves the cell as the callback left it.
#[derive(Clone)]
pub struct CellCallback(Arc<CellFn>);

impl CellCallback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut CellContext<'_>) -> BridgeResult<Option<CellValue>> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, ctx: &mut CellContext<'_>) -> BridgeResult<Option<CellValue>> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for CellCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CellCallback")
    }
}

/// Per-field formatting attached to a title node
#[derive(Clone)]
pub struct FieldFormat(Arc<FormatFn>);

impl FieldFormat {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut FormatContext<'_>) -> BridgeResult<Option<CellValue>> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Format that only maps the raw value
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(&CellValue) -> CellValue + Send + Sync + 'static,
    {
        Self::new(move |ctx| Ok(Some(f(ctx.value))))
    }

    pub fn call(&self, ctx: &mut FormatContext<'_>) -> BridgeResult<Option<CellValue>> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for FieldFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldFormat")
    }
}

/// Fallback formatting for plain values, injected into the exporter
#[derive(Clone)]
pub struct DefaultFormat(Arc<DefaultFn>);

impl DefaultFormat {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&CellValue, &ResolvedTitle) -> Option<CellValue> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Writes the value unchanged
    pub fn identity() -> Self {
        Self::new(|value, _| Some(value.clone()))
    }

    pub fn call(&self, value: &CellValue, title: &ResolvedTitle) -> Option<CellValue> {
        (self.0)(value, title)
    }
}

impl Default for DefaultFormat {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for DefaultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultFormat")
    }
}

//==============================================================================
// Records
//==============================================================================

#[derive(Debug, Clone)]
pub enum RecordValue {
    Value(CellValue),
    Computed(CellCallback),
}

macro_rules! record_value_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for RecordValue {
                fn from(value: $t) -> Self {
                    RecordValue::Value(value.into())
                }
            }
        )*
    };
}

record_value_from!(CellValue, &str, String, f64, i64, i32, bool);

/// One row of export data, written in field insertion order
#[derive(Debug, Clone, Default)]
pub struct Record {
    values: IndexMap<String, RecordValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<RecordValue>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn computed<F>(self, field: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut CellContext<'_>) -> BridgeResult<Option<CellValue>> + Send + Sync + 'static,
    {
        self.set(field, RecordValue::Computed(CellCallback::new(f)))
    }

    pub fn get(&self, field: &str) -> Option<&RecordValue> {
        self.values.get(field)
    }

    /// The plain value of `field`, if it is not computed
    pub fn value(&self, field: &str) -> Option<&CellValue> {
        match self.values.get(field) {
            Some(RecordValue::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RecordValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<IndexMap<String, CellValue>> for Record {
    fn from(values: IndexMap<String, CellValue>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k, RecordValue::Value(v)))
                .collect(),
        }
    }
}

/// One output sheet: its name and rows
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    pub name: String,
    pub records: Vec<Record>,
}

impl SheetData {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

//==============================================================================
// Resolution Chain
//==============================================================================

/// Where a cell's value comes from
pub enum CellSource<'a> {
    RecordOverride(&'a CellCallback),
    FieldFormat(&'a FieldFormat, &'a CellValue),
    Default(&'a CellValue),
}

impl<'a> CellSource<'a> {
    pub fn select(value: &'a RecordValue, title: &'a ResolvedTitle) -> Self {
        match (value, &title.format) {
            (RecordValue::Computed(callback), _) => CellSource::RecordOverride(callback),
            (RecordValue::Value(raw), Some(format)) => CellSource::FieldFormat(format, raw),
            (RecordValue::Value(raw), None) => CellSource::Default(raw),
        }
    }
}
