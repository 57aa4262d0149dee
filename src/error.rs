use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Style error: {0}")]
    Style(String),

    #[error("Invalid cell reference: {0}")]
    CellReference(String),

    #[error("Merge error: {0}")]
    Merge(String),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rust_xlsxwriter::XlsxError> for BridgeError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        BridgeError::Document(format!("Failed to write workbook: {}", e))
    }
}

impl From<calamine::Error> for BridgeError {
    fn from(e: calamine::Error) -> Self {
        BridgeError::Document(format!("Failed to read workbook: {}", e))
    }
}

impl From<csv::Error> for BridgeError {
    fn from(e: csv::Error) -> Self {
        BridgeError::Document(format!("CSV error: {}", e))
    }
}
