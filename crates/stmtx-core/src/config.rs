use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StmtError;
use crate::formats::builtin::load_format;

/// Clamp applied to spreadsheet column widths, in character units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnWidthPolicy {
    pub min: f64,
    pub max: f64,
}

impl Default for ColumnWidthPolicy {
    fn default() -> Self {
        ColumnWidthPolicy { min: 8.0, max: 60.0 }
    }
}

impl ColumnWidthPolicy {
    pub fn clamp(&self, width: f64) -> f64 {
        width.max(self.min).min(self.max)
    }
}

/// Engine settings. Every field has a default, so `{}` is a valid file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    /// Pages processed concurrently.
    pub max_workers: usize,
    /// Bound on each external tool call for a page.
    pub page_timeout_secs: u64,
    /// Drop cells beyond this many columns.
    pub max_columns: Option<usize>,
    /// Try OCR on pages without text.
    pub ocr: bool,
    /// Enabled bank formats in chain order; None enables all built-ins.
    pub formats: Option<Vec<String>>,
    pub column_width: ColumnWidthPolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            max_workers: 4,
            page_timeout_secs: 60,
            max_columns: None,
            ocr: true,
            formats: None,
            column_width: ColumnWidthPolicy::default(),
        }
    }
}

impl EngineOptions {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

/// Load options from a JSON file.
pub fn load_options(path: &Path) -> Result<EngineOptions, StmtError> {
    let content = std::fs::read_to_string(path).map_err(|e| StmtError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let options: EngineOptions =
        serde_json::from_str(&content).map_err(|e| StmtError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_options(&options)?;
    Ok(options)
}

/// Parse options from a JSON string (no file path context).
pub fn parse_options_str(json: &str) -> Result<EngineOptions, StmtError> {
    let options: EngineOptions = serde_json::from_str(json).map_err(StmtError::Json)?;
    validate_options(&options)?;
    Ok(options)
}

pub fn validate_options(options: &EngineOptions) -> Result<(), StmtError> {
    if options.max_workers == 0 {
        return Err(StmtError::ConfigInvalid(
            "max_workers must be at least 1".into(),
        ));
    }

    if options.page_timeout_secs == 0 {
        return Err(StmtError::ConfigInvalid(
            "page_timeout_secs must be at least 1".into(),
        ));
    }

    if options.max_columns == Some(0) {
        return Err(StmtError::ConfigInvalid(
            "max_columns must be at least 1 when set".into(),
        ));
    }

    let width = &options.column_width;
    if !(width.min > 0.0 && width.max > 0.0) {
        return Err(StmtError::ConfigInvalid(
            "column widths must be positive".into(),
        ));
    }
    if width.min > width.max {
        return Err(StmtError::ConfigInvalid(format!(
            "column_width.min ({}) exceeds column_width.max ({})",
            width.min, width.max
        )));
    }

    if let Some(ref formats) = options.formats {
        for name in formats {
            load_format(name)?;
        }
    }

    Ok(())
}
