use crate::error::StmtError;
use crate::extraction::{DocumentSource, PageContent};

/// Pre-extracted text, one page per form-feed separated chunk.
///
/// This is the format `pdftotext` writes when given a whole document.
pub struct PlainTextSource {
    pages: Vec<String>,
}

impl PlainTextSource {
    pub fn new(text: &str) -> Self {
        let mut pages: Vec<String> = text.split('\x0c').map(str::to_string).collect();
        // pdftotext terminates the last page with a form feed too
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        PlainTextSource { pages }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StmtError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| StmtError::DocumentUnreadable(format!("text is not UTF-8: {e}")))?;
        Ok(Self::new(text))
    }
}

impl DocumentSource for PlainTextSource {
    fn page_count(&self) -> Result<usize, StmtError> {
        Ok(self.pages.len())
    }

    fn page_content(&self, page_number: usize) -> Result<PageContent, StmtError> {
        let text = page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .ok_or_else(|| StmtError::PageUnreadable {
                page: page_number,
                reason: format!("document has {} page(s)", self.pages.len()),
            })?;
        Ok(PageContent::from_text(page_number, text))
    }

    fn backend_name(&self) -> &str {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_form_feed() {
        let source = PlainTextSource::new("page one\nline\x0cpage two\x0c");
        assert_eq!(source.page_count().unwrap(), 2);
        let page = source.page_content(2).unwrap();
        assert_eq!(page.page_number, 2);
        assert_eq!(page.lines, vec!["page two"]);
    }

    #[test]
    fn test_out_of_range_page() {
        let source = PlainTextSource::new("only page");
        assert!(matches!(
            source.page_content(3),
            Err(StmtError::PageUnreadable { page: 3, .. })
        ));
        assert!(source.page_content(0).is_err());
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        assert!(matches!(
            PlainTextSource::from_bytes(&[0xff, 0xfe, 0x00]),
            Err(StmtError::DocumentUnreadable(_))
        ));
    }
}
