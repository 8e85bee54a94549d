use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StmtError {
    #[error("document unreadable: {0}")]
    DocumentUnreadable(String),

    #[error("page {page} unreadable: {reason}")]
    PageUnreadable { page: usize, reason: String },

    #[error("page {page} timed out after {seconds}s")]
    PageTimeout { page: usize, seconds: u64 },

    #[error("failed to write spreadsheet: {0}")]
    SinkWrite(String),

    #[error("{tool} not found. Install poppler-utils (pdftotext, pdfinfo, pdftoppm) and tesseract-ocr")]
    ToolNotFound { tool: String },

    #[error("{tool} failed with exit code {code}: {stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        stderr: String,
    },

    #[error("failed to load options from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid options: {0}")]
    ConfigInvalid(String),

    #[error("failed to start page workers: {0}")]
    WorkerPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
