pub mod builtin;
pub mod native;
pub mod text_fallback;
pub mod txn_table;
pub mod upi;

use std::fmt;

use tracing::debug;

use crate::error::StmtError;
use crate::extraction::PageContent;
use crate::model::CandidateTable;

/// A named, layout-specific parser.
///
/// `signature` is a cheap precondition: when it does not match, the format
/// yields nothing and `parse` is never called.
#[derive(Clone, Copy)]
pub struct BankFormat {
    pub name: &'static str,
    pub description: &'static str,
    pub signature: fn(&PageContent) -> bool,
    pub parse: fn(&PageContent) -> Vec<CandidateTable>,
}

impl BankFormat {
    pub fn extract(&self, page: &PageContent) -> Vec<CandidateTable> {
        if !(self.signature)(page) {
            return Vec::new();
        }
        (self.parse)(page)
    }
}

impl fmt::Debug for BankFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BankFormat")
            .field("name", &self.name)
            .finish()
    }
}

/// One strategy in the extractor chain.
#[derive(Debug, Clone)]
pub enum Extractor {
    NativeTable,
    BankFormat(BankFormat),
    GenericTable,
    TextFallback,
}

impl Extractor {
    pub fn name(&self) -> &str {
        match self {
            Extractor::NativeTable => "native-table",
            Extractor::BankFormat(format) => format.name,
            Extractor::GenericTable => "generic-table",
            Extractor::TextFallback => "text-fallback",
        }
    }

    pub fn extract(&self, page: &PageContent) -> Vec<CandidateTable> {
        match self {
            Extractor::NativeTable => native::extract_native_tables(page),
            Extractor::BankFormat(format) => format.extract(page),
            Extractor::GenericTable => native::extract_generic_tables(page),
            Extractor::TextFallback => text_fallback::extract_from_text(page),
        }
    }
}

/// Prioritized extractors: native tables, bank formats, generic tables, then
/// raw text. The first extractor yielding a table with content wins the page.
#[derive(Debug, Clone)]
pub struct ExtractorChain {
    extractors: Vec<Extractor>,
}

impl ExtractorChain {
    pub fn new(formats: Vec<BankFormat>) -> Self {
        let mut extractors = Vec::with_capacity(formats.len() + 3);
        extractors.push(Extractor::NativeTable);
        extractors.extend(formats.into_iter().map(Extractor::BankFormat));
        extractors.push(Extractor::GenericTable);
        extractors.push(Extractor::TextFallback);
        ExtractorChain { extractors }
    }

    /// Chain with every built-in bank format enabled.
    pub fn builtin() -> Self {
        Self::new(builtin::builtin_formats())
    }

    /// Chain with the named built-in formats, in the given order.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, StmtError> {
        let formats = names
            .iter()
            .map(|name| builtin::load_format(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(formats))
    }

    /// Add a bank format after the existing ones, ahead of the generic table
    /// extractor.
    pub fn register_format(&mut self, format: BankFormat) {
        let at = self
            .extractors
            .iter()
            .position(|e| matches!(e, Extractor::GenericTable))
            .unwrap_or(self.extractors.len());
        self.extractors.insert(at, Extractor::BankFormat(format));
    }

    pub fn extractors(&self) -> &[Extractor] {
        &self.extractors
    }

    /// Run the chain over one page. Returns the winning extractor's tables,
    /// or an empty list when none produced anything.
    pub fn extract_page(&self, page: &PageContent) -> Vec<CandidateTable> {
        for extractor in &self.extractors {
            let tables: Vec<CandidateTable> = extractor
                .extract(page)
                .into_iter()
                .filter(CandidateTable::has_content)
                .collect();
            if !tables.is_empty() {
                debug!(
                    page = page.page_number,
                    extractor = extractor.name(),
                    tables = tables.len(),
                    "extractor matched"
                );
                return tables;
            }
        }
        debug!(page = page.page_number, "no extractor matched");
        Vec::new()
    }
}

impl Default for ExtractorChain {
    fn default() -> Self {
        Self::builtin()
    }
}
