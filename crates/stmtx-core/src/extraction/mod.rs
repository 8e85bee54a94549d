pub mod pdftotext;
pub mod text;
pub mod xlsx;

use crate::error::StmtError;

/// Rows of raw cell strings, as reported by a layout analyser.
pub type RawTable = Vec<Vec<String>>;

/// Content of a single document page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    /// 1-based page index.
    pub page_number: usize,
    pub lines: Vec<String>,
    /// Tables already detected by the document backend.
    pub tables: Vec<RawTable>,
}

impl PageContent {
    pub fn from_lines(page_number: usize, lines: Vec<String>) -> Self {
        PageContent {
            page_number,
            lines,
            tables: Vec::new(),
        }
    }

    /// Split text into lines for the given page.
    pub fn from_text(page_number: usize, text: &str) -> Self {
        Self::from_lines(page_number, text.lines().map(str::to_string).collect())
    }

    pub fn has_text(&self) -> bool {
        self.lines.iter().any(|l| !l.trim().is_empty())
    }

    /// True when the page offers neither text nor tables.
    pub fn is_blank(&self) -> bool {
        !self.has_text() && self.tables.iter().flatten().flatten().all(|c| c.trim().is_empty())
    }

    pub fn text_lowercase(&self) -> String {
        self.lines.join("\n").to_lowercase()
    }
}

/// A document the engine can read page by page.
///
/// The engine never decodes document bytes itself; backends implement this.
pub trait DocumentSource: Send + Sync {
    fn page_count(&self) -> Result<usize, StmtError>;

    /// Content of a 1-based page.
    fn page_content(&self, page_number: usize) -> Result<PageContent, StmtError>;

    /// Rasterize a page and run OCR on it. Backends without OCR return None.
    fn rasterize_and_ocr(&self, _page_number: usize) -> Result<Option<String>, StmtError> {
        Ok(None)
    }

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
