//! Output location, file name and file type resolution

use crate::error::{BridgeError, BridgeResult};
use chrono::format::{Item, StrftimeItems};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Spreadsheet file types an export can be written as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    Xlsx,
    Xls,
    Csv,
}

impl ExportType {
    /// Case-insensitive lookup; `None` for anything unrecognized
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Sub-directory placed between the export root and the file
#[derive(Clone, Default)]
pub enum DatePath {
    #[default]
    None,
    /// Today's date as `YYYYMMDD`
    Today,
    /// Today's date in a strftime format, e.g. `%Y/%m`
    Format(String),
    Generator(Arc<dyn Fn() -> String + Send + Sync>),
}

impl DatePath {
    pub fn generator<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        DatePath::Generator(Arc::new(f))
    }

    fn resolve(&self) -> BridgeResult<String> {
        match self {
            DatePath::None => Ok(String::new()),
            DatePath::Today => Ok(chrono::Local::now().format("%Y%m%d").to_string()),
            DatePath::Format(format) => {
                if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                    return Err(BridgeError::Document(format!(
                        "Invalid date path format '{}'",
                        format
                    )));
                }
                Ok(chrono::Local::now().format(format).to_string())
            }
            DatePath::Generator(generate) => Ok(generate()),
        }
    }
}

impl fmt::Debug for DatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatePath::None => f.write_str("None"),
            DatePath::Today => f.write_str("Today"),
            DatePath::Format(format) => f.debug_tuple("Format").field(format).finish(),
            DatePath::Generator(_) => f.write_str("Generator"),
        }
    }
}

/// Build `root/date_path` and create it with any missing parents
pub fn resolve_dir(root: &Path, date_path: &DatePath) -> BridgeResult<PathBuf> {
    let sub = date_path.resolve()?;
    let dir = if sub.is_empty() {
        root.to_path_buf()
    } else {
        root.join(sub)
    };

    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// `name.ext`, defaulting the name to a hash of the current time
pub fn resolve_file_name(name: Option<&str>, kind: ExportType) -> String {
    let stem = match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => time_hash(),
    };
    format!("{}.{}", stem, kind.extension())
}

fn time_hash() -> String {
    let seconds = chrono::Utc::now().timestamp();
    format!("{:x}", Md5::digest(seconds.to_string().as_bytes()))
}
