//! Export jobs: titles, sheets and merges described in a YAML or JSON file

use crate::error::{BridgeError, BridgeResult};
use crate::export::{ExportConfig, Exporter, Record, SheetData};
use crate::title::SheetTitle;
use crate::types::{CellRef, CellValue, MergeRange};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// ```yaml
/// type: xlsx
/// name: users
/// titles:
///   - children:
///       - { field: id, name: ID, width: 10 }
///       - field: info
///         name: Info
///         children:
///           - { field: name, name: Name, color: "#0000ff" }
/// sheets:
///   - name: users
///     records:
///       - { id: 1, name: alice }
/// merges:
///   - { sheet: 0, range: "A4:A5" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExportJob {
    #[serde(rename = "type")]
    pub export_type: Option<String>,
    /// File name without extension
    pub name: Option<String>,
    pub font_size: Option<f64>,
    pub titles: Vec<SheetTitle>,
    pub sheets: Vec<JobSheet>,
    pub merges: Vec<JobMerge>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobSheet {
    pub name: String,
    pub records: Vec<IndexMap<String, CellValue>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobMerge {
    #[serde(default)]
    pub sheet: usize,
    /// `A4:A5`
    pub range: String,
}

impl JobMerge {
    pub fn parse_range(&self) -> BridgeResult<MergeRange> {
        let (start, end) = match self.range.split_once(':') {
            Some((start, end)) => (CellRef::parse(start)?, CellRef::parse(end)?),
            None => {
                let cell = CellRef::parse(&self.range)?;
                (cell, cell)
            }
        };
        Ok(MergeRange::new(start.column, start.row, end.column, end.row))
    }
}

/// Load a job, choosing the parser by file extension
pub fn load_job(path: &Path) -> BridgeResult<ExportJob> {
    let content = fs::read_to_string(path).map_err(|e| {
        BridgeError::Document(format!("Failed to read job {}: {}", path.display(), e))
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

impl ExportJob {
    /// An exporter loaded with this job's data
    pub fn into_exporter(self, config: ExportConfig) -> BridgeResult<Exporter> {
        let mut config = config;
        if let Some(size) = self.font_size {
            config.font_size = size;
        }

        let sheets = self
            .sheets
            .into_iter()
            .map(|sheet| {
                let records = sheet.records.into_iter().map(Record::from).collect();
                SheetData::new(sheet.name, records)
            })
            .collect();

        let mut exporter = Exporter::new(sheets)
            .titles(self.titles)
            .with_config(config);

        if let Some(kind) = self.export_type {
            exporter = exporter.with_type(kind);
        }

        for merge in &self.merges {
            let range = merge.parse_range()?;
            exporter = exporter.add_merge(
                merge.sheet,
                range.start_column,
                range.start_row,
                range.end_column,
                range.end_row,
            );
        }

        Ok(exporter)
    }
}
