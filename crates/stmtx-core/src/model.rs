use serde::{Deserialize, Serialize};
use std::fmt;

/// Which extractor produced a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TableOrigin {
    NativeTable,
    GenericTable,
    Format(String),
    TextFallback,
}

impl fmt::Display for TableOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableOrigin::NativeTable => write!(f, "native-table"),
            TableOrigin::GenericTable => write!(f, "generic-table"),
            TableOrigin::Format(name) => write!(f, "format:{name}"),
            TableOrigin::TextFallback => write!(f, "text-fallback"),
        }
    }
}

impl From<TableOrigin> for String {
    fn from(origin: TableOrigin) -> Self {
        origin.to_string()
    }
}

impl TryFrom<String> for TableOrigin {
    type Error = String;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        match tag.as_str() {
            "native-table" => Ok(TableOrigin::NativeTable),
            "generic-table" => Ok(TableOrigin::GenericTable),
            "text-fallback" => Ok(TableOrigin::TextFallback),
            other => match other.strip_prefix("format:") {
                Some(name) if !name.is_empty() => Ok(TableOrigin::Format(name.to_string())),
                _ => Err(format!("unknown table origin '{other}'")),
            },
        }
    }
}

/// An unnormalized table produced by one extractor invocation for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTable {
    pub page_number: usize,
    pub rows: Vec<Vec<String>>,
    pub origin: TableOrigin,
    /// True when the first row labels the columns.
    pub has_header: bool,
}

impl CandidateTable {
    pub fn new(
        page_number: usize,
        rows: Vec<Vec<String>>,
        origin: TableOrigin,
        has_header: bool,
    ) -> Self {
        CandidateTable {
            page_number,
            rows,
            origin,
            has_header,
        }
    }

    /// True when at least one cell holds non-whitespace text.
    pub fn has_content(&self) -> bool {
        self.rows
            .iter()
            .flatten()
            .any(|cell| !cell.trim().is_empty())
    }
}

/// A table whose rows all share the same column count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTable {
    pub page_number: usize,
    pub rows: Vec<Vec<String>>,
    pub column_count: usize,
    pub origin: TableOrigin,
    pub has_header: bool,
    /// Cells dropped by the max-width policy (0 when no policy applied).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub truncated_cells: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl NormalizedTable {
    pub fn header(&self) -> Option<&[String]> {
        if self.has_header {
            self.rows.first().map(Vec::as_slice)
        } else {
            None
        }
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        if self.has_header {
            &self.rows[1..]
        } else {
            &self.rows
        }
    }

    pub fn data_row_count(&self) -> usize {
        self.data_rows().len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Ok,
    OkFallbackRawText,
    Failed,
    Cancelled,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Ok | Outcome::OkFallbackRawText)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ok => write!(f, "ok"),
            Outcome::OkFallbackRawText => write!(f, "ok-fallback-raw-text"),
            Outcome::Failed => write!(f, "failed"),
            Outcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageStatus {
    Extracted { tables: usize, origin: TableOrigin },
    Empty,
    Unreadable { reason: String },
    TimedOut,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageReport {
    pub page_number: usize,
    #[serde(flatten)]
    pub status: PageStatus,
}

/// Aggregated result of running the extractor chain over a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub page_count: usize,
    pub pages_processed: usize,
    /// Tables in non-decreasing page order.
    pub tables: Vec<NormalizedTable>,
    /// Rows across all tables, header rows excluded.
    pub total_data_rows: usize,
    /// Cells dropped by the max-width policy across all tables.
    #[serde(default)]
    pub truncated_cells: usize,
    pub outcome: Outcome,
    pub page_reports: Vec<PageReport>,
}

/// What the calling shell gets back from a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSummary {
    pub outcome: Outcome,
    pub pages_processed: usize,
    pub message: String,
}
