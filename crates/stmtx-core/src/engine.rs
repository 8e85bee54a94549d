use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::EngineOptions;
use crate::error::StmtError;
use crate::extraction::{DocumentSource, PageContent};
use crate::formats::ExtractorChain;
use crate::model::{
    ExtractionResult, NormalizedTable, Outcome, PageReport, PageStatus, TableOrigin,
};
use crate::normalize::normalize_table;

/// Cooperative cancellation flag, checked before each page starts.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What one page contributed.
#[derive(Debug)]
struct PageRun {
    tables: Vec<NormalizedTable>,
    status: PageStatus,
}

impl PageRun {
    fn with_status(status: PageStatus) -> Self {
        PageRun {
            tables: Vec::new(),
            status,
        }
    }
}

/// Run the extractor chain over every page of a document.
///
/// Pages are processed on a pool of `options.max_workers` threads and merged
/// back in page order. Page-level failures are recorded in `page_reports`
/// and never abort the run; only a document whose page count cannot be read
/// is an error.
pub fn extract(
    source: &dyn DocumentSource,
    chain: &ExtractorChain,
    options: &EngineOptions,
    cancel: &CancellationToken,
) -> Result<ExtractionResult, StmtError> {
    let page_count = match source.page_count() {
        Ok(0) => {
            return Err(StmtError::DocumentUnreadable(
                "document has no pages".into(),
            ))
        }
        Ok(count) => count,
        Err(StmtError::DocumentUnreadable(reason)) => {
            return Err(StmtError::DocumentUnreadable(reason))
        }
        Err(e) => return Err(StmtError::DocumentUnreadable(e.to_string())),
    };

    debug!(
        pages = page_count,
        backend = source.backend_name(),
        workers = options.max_workers,
        "extracting document"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.max_workers)
        .build()
        .map_err(|e| StmtError::WorkerPool(e.to_string()))?;

    let mut runs: Vec<(usize, PageRun)> = pool.install(|| {
        (1..=page_count)
            .into_par_iter()
            .map(|page| (page, run_page(source, chain, options, cancel, page)))
            .collect()
    });
    runs.sort_by_key(|(page, _)| *page);

    let mut tables = Vec::new();
    let mut page_reports = Vec::with_capacity(page_count);
    for (page_number, run) in runs {
        tables.extend(run.tables);
        page_reports.push(PageReport {
            page_number,
            status: run.status,
        });
    }

    let pages_processed = page_reports
        .iter()
        .filter(|r| r.status != PageStatus::Cancelled)
        .count();
    let total_data_rows = tables.iter().map(NormalizedTable::data_row_count).sum();
    let truncated_cells = tables.iter().map(|t| t.truncated_cells).sum();
    let outcome = classify_outcome(&tables, &page_reports);

    info!(
        pages = page_count,
        processed = pages_processed,
        tables = tables.len(),
        rows = total_data_rows,
        %outcome,
        "extraction finished"
    );

    Ok(ExtractionResult {
        page_count,
        pages_processed,
        tables,
        total_data_rows,
        truncated_cells,
        outcome,
        page_reports,
    })
}

fn run_page(
    source: &dyn DocumentSource,
    chain: &ExtractorChain,
    options: &EngineOptions,
    cancel: &CancellationToken,
    page_number: usize,
) -> PageRun {
    if cancel.is_cancelled() {
        return PageRun::with_status(PageStatus::Cancelled);
    }

    let content = match load_page(source, options, page_number) {
        Ok(content) => content,
        Err(StmtError::PageTimeout { seconds, .. }) => {
            warn!(page = page_number, seconds, "page timed out");
            return PageRun::with_status(PageStatus::TimedOut);
        }
        Err(e) => {
            warn!(page = page_number, error = %e, "page unreadable");
            return PageRun::with_status(PageStatus::Unreadable {
                reason: e.to_string(),
            });
        }
    };

    let tables: Vec<NormalizedTable> = chain
        .extract_page(&content)
        .iter()
        .filter_map(|candidate| normalize_table(candidate, options.max_columns))
        .collect();

    let status = match tables.first() {
        Some(first) => PageStatus::Extracted {
            tables: tables.len(),
            origin: first.origin.clone(),
        },
        None => PageStatus::Empty,
    };
    PageRun { tables, status }
}

/// Page content, with OCR text substituted when the page has none.
fn load_page(
    source: &dyn DocumentSource,
    options: &EngineOptions,
    page_number: usize,
) -> Result<PageContent, StmtError> {
    let mut content = source.page_content(page_number)?;
    // Sources may leave the index unset; the engine owns it.
    content.page_number = page_number;

    if options.ocr && content.is_blank() {
        if let Some(text) = source.rasterize_and_ocr(page_number)? {
            debug!(page = page_number, "using OCR text");
            content.lines = text.lines().map(str::to_string).collect();
        }
    }

    Ok(content)
}

fn classify_outcome(tables: &[NormalizedTable], reports: &[PageReport]) -> Outcome {
    if reports.iter().any(|r| r.status == PageStatus::Cancelled) {
        Outcome::Cancelled
    } else if tables.is_empty() {
        Outcome::Failed
    } else if tables.iter().all(|t| t.origin == TableOrigin::TextFallback) {
        Outcome::OkFallbackRawText
    } else {
        Outcome::Ok
    }
}

/// One-line description of an extraction result.
pub fn summarize(result: &ExtractionResult) -> String {
    let pages = result.pages_processed;
    let rows = result.total_data_rows;
    match result.outcome {
        Outcome::Ok => format!("Converted {pages} page(s) with {rows} transaction(s)"),
        Outcome::OkFallbackRawText => {
            format!("Converted {pages} page(s) with {rows} row(s) (raw text format)")
        }
        Outcome::Failed => format!("No transaction data found in {pages} page(s)"),
        Outcome::Cancelled => format!(
            "Cancelled after {} of {} page(s)",
            pages, result.page_count
        ),
    }
}
