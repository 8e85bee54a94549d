pub mod convert;
pub mod extract;
pub mod formats;

use std::path::Path;

use stmtx_core::config::{load_options, validate_options, EngineOptions};
use stmtx_core::error::StmtError;
use stmtx_core::extraction::pdftotext::PdftotextSource;
use stmtx_core::extraction::text::PlainTextSource;
use stmtx_core::extraction::xlsx::XlsxSource;
use stmtx_core::extraction::DocumentSource;

use crate::EngineArgs;

impl EngineArgs {
    /// Options from the config file (or defaults) with flag overrides applied.
    pub fn resolve(&self) -> Result<EngineOptions, StmtError> {
        let mut options = match self.config {
            Some(ref path) => load_options(path)?,
            None => EngineOptions::default(),
        };

        if let Some(workers) = self.workers {
            options.max_workers = workers;
        }
        if let Some(secs) = self.timeout {
            options.page_timeout_secs = secs;
        }
        if self.max_columns.is_some() {
            options.max_columns = self.max_columns;
        }
        if self.no_ocr {
            options.ocr = false;
        }
        if !self.formats.is_empty() {
            options.formats = Some(self.formats.clone());
        }

        validate_options(&options)?;
        Ok(options)
    }
}

/// Pick the page source by file extension.
pub fn open_source(path: &Path, options: &EngineOptions) -> Result<Box<dyn DocumentSource>, StmtError> {
    let bytes = std::fs::read(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let source: Box<dyn DocumentSource> = match ext.as_str() {
        "xlsx" => Box::new(XlsxSource::from_bytes(&bytes)?),
        "txt" => Box::new(PlainTextSource::from_bytes(&bytes)?),
        _ => {
            if !PdftotextSource::is_available() {
                return Err(StmtError::ToolNotFound {
                    tool: "pdftotext".into(),
                });
            }
            Box::new(PdftotextSource::from_bytes(&bytes, options.page_timeout())?)
        }
    };
    Ok(source)
}
