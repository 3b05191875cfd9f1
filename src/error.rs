use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Could not write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input file is unreadable, or lacks the expected sheet or columns.
    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid selection: {0}")]
    Selection(String),

    /// Options that cannot be combined.
    #[error("Invalid usage: {0}")]
    Usage(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
