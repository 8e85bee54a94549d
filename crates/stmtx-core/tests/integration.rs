//! Integration tests for the extraction engine and `convert()`.
//!
//! Uses a MockSource that serves pre-built PageContent, so these tests run
//! without poppler-utils or tesseract.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use stmtx_core::config::EngineOptions;
use stmtx_core::engine::CancellationToken;
use stmtx_core::error::StmtError;
use stmtx_core::extraction::{DocumentSource, PageContent, RawTable};
use stmtx_core::model::{ExtractionResult, Outcome, PageStatus, TableOrigin};
use stmtx_core::sink::xlsx::{write_xlsx_to_vec, SHEET_NAME};
use stmtx_core::sink::{TableSink, XlsxSink};
use stmtx_core::transactions::to_records;
use stmtx_core::{convert, convert_with_cancellation, extract_document};

#[derive(Default)]
struct MockSource {
    pages: Vec<PageContent>,
    unreadable: HashSet<usize>,
    timed_out: HashSet<usize>,
    ocr_text: HashMap<usize, String>,
    /// Fired while page 1 is being read.
    cancel_on_first_page: Option<CancellationToken>,
    broken: bool,
}

impl MockSource {
    fn new(pages: Vec<PageContent>) -> Self {
        MockSource {
            pages,
            ..Default::default()
        }
    }
}

impl DocumentSource for MockSource {
    fn page_count(&self) -> Result<usize, StmtError> {
        if self.broken {
            return Err(StmtError::DocumentUnreadable("not a PDF".into()));
        }
        Ok(self.pages.len())
    }

    fn page_content(&self, page_number: usize) -> Result<PageContent, StmtError> {
        if page_number == 1 {
            if let Some(ref token) = self.cancel_on_first_page {
                token.cancel();
            }
        }
        if self.timed_out.contains(&page_number) {
            return Err(StmtError::PageTimeout {
                page: page_number,
                seconds: 60,
            });
        }
        if self.unreadable.contains(&page_number) {
            return Err(StmtError::PageUnreadable {
                page: page_number,
                reason: "corrupt content stream".into(),
            });
        }
        Ok(self.pages[page_number - 1].clone())
    }

    fn rasterize_and_ocr(&self, page_number: usize) -> Result<Option<String>, StmtError> {
        Ok(self.ocr_text.get(&page_number).cloned())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

#[derive(Default)]
struct RecordingSink {
    writes: Vec<ExtractionResult>,
}

impl TableSink for RecordingSink {
    fn write(&mut self, result: &ExtractionResult) -> Result<(), StmtError> {
        self.writes.push(result.clone());
        Ok(())
    }
}

struct FailingSink;

impl TableSink for FailingSink {
    fn write(&mut self, _result: &ExtractionResult) -> Result<(), StmtError> {
        Err(StmtError::SinkWrite("disk full".into()))
    }
}

fn table(rows: &[&[&str]]) -> RawTable {
    rows.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

fn text_page(number: usize, text: &str) -> PageContent {
    PageContent::from_text(number, text)
}

fn table_page(number: usize, tables: Vec<RawTable>) -> PageContent {
    PageContent {
        page_number: number,
        lines: vec![],
        tables,
    }
}

fn native_statement_page(number: usize) -> PageContent {
    table_page(
        number,
        vec![table(&[
            &["Date", "Description", "Debit", "Credit", "Balance"],
            &["01/01/2024", "Salary", "", "50,000.00", "50,000.00"],
        ])],
    )
}

const ACME_TEXT: &str =
    "Acme Bank\nStatement\nDate Description Debit Credit Balance\n01-02-2024 Coffee 4.50 0.00 995.50";

fn run(source: &MockSource, options: &EngineOptions) -> ExtractionResult {
    extract_document(source, options, &CancellationToken::new()).unwrap()
}

// ---------------------------------------------------------------------------
// Scenario A: clean native table
// ---------------------------------------------------------------------------
#[test]
fn native_table_page() {
    let source = MockSource::new(vec![native_statement_page(1)]);
    let result = run(&source, &EngineOptions::default());

    assert_eq!(result.outcome, Outcome::Ok);
    assert_eq!(result.tables.len(), 1);
    let t = &result.tables[0];
    assert_eq!(t.rows.len(), 2);
    assert_eq!(t.column_count, 5);
    assert!(t.has_header);
    assert_eq!(t.origin, TableOrigin::NativeTable);
    assert_eq!(result.total_data_rows, 1);
}

// ---------------------------------------------------------------------------
// Scenario B: raw text with letterhead
// ---------------------------------------------------------------------------
#[test]
fn text_fallback_after_letterhead() {
    let source = MockSource::new(vec![text_page(1, ACME_TEXT)]);
    let result = run(&source, &EngineOptions::default());

    assert_eq!(result.outcome, Outcome::OkFallbackRawText);
    assert_eq!(result.tables.len(), 1);
    let t = &result.tables[0];
    assert_eq!(t.origin, TableOrigin::TextFallback);
    assert_eq!(t.header().unwrap()[0], "Date");
    assert_eq!(t.data_row_count(), 1);
    assert_eq!(
        t.data_rows()[0],
        vec!["01-02-2024", "Coffee", "4.50", "0.00", "995.50"]
    );
}

// ---------------------------------------------------------------------------
// Scenario C: nothing usable on the page
// ---------------------------------------------------------------------------
#[test]
fn short_lines_yield_empty_page() {
    let source = MockSource::new(vec![text_page(1, "Hello!\n\n- 1 -")]);
    let result = run(&source, &EngineOptions::default());

    assert_eq!(result.outcome, Outcome::Failed);
    assert!(result.tables.is_empty());
    assert_eq!(result.pages_processed, 1);
    assert_eq!(result.page_reports[0].status, PageStatus::Empty);
}

// ---------------------------------------------------------------------------
// Scenario D: one productive page, one empty page
// ---------------------------------------------------------------------------
#[test]
fn multi_page_with_empty_second_page() {
    let source = MockSource::new(vec![native_statement_page(1), text_page(2, "")]);
    let result = run(&source, &EngineOptions::default());

    assert_eq!(result.outcome, Outcome::Ok);
    assert_eq!(result.pages_processed, 2);
    assert_eq!(result.tables.len(), 1);
    assert_eq!(result.tables[0].page_number, 1);
    assert_eq!(result.page_reports[1].status, PageStatus::Empty);
}

#[test]
fn repeated_runs_are_identical() {
    let source = MockSource::new(vec![
        native_statement_page(1),
        text_page(2, ACME_TEXT),
        text_page(3, "12/03/2024 Rent 1,200.00\n13/03/2024 Groceries 85.40"),
    ]);
    let options = EngineOptions::default();
    let first = serde_json::to_string(&run(&source, &options)).unwrap();
    let second = serde_json::to_string(&run(&source, &options)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn tables_stay_in_page_order_across_workers() {
    let pages = (1..=12)
        .map(|n| text_page(n, &format!("{n:02}/01/2024 Payment {n} 10.00 990.00")))
        .collect();
    let source = MockSource::new(pages);
    let options = EngineOptions {
        max_workers: 4,
        ..Default::default()
    };
    let result = run(&source, &options);

    let order: Vec<usize> = result.tables.iter().map(|t| t.page_number).collect();
    assert_eq!(order, (1..=12).collect::<Vec<_>>());
    let reported: Vec<usize> = result.page_reports.iter().map(|r| r.page_number).collect();
    assert_eq!(reported, (1..=12).collect::<Vec<_>>());
}

#[test]
fn unreadable_page_does_not_abort() {
    let mut source = MockSource::new(vec![
        native_statement_page(1),
        native_statement_page(2),
        native_statement_page(3),
    ]);
    source.unreadable.insert(2);
    let result = run(&source, &EngineOptions::default());

    assert_eq!(result.outcome, Outcome::Ok);
    assert_eq!(result.tables.len(), 2);
    assert_eq!(result.pages_processed, 3);
    assert!(matches!(
        result.page_reports[1].status,
        PageStatus::Unreadable { .. }
    ));
}

#[test]
fn ocr_text_used_for_blank_page() {
    let mut source = MockSource::new(vec![text_page(1, "")]);
    source.ocr_text.insert(1, ACME_TEXT.to_string());

    let result = run(&source, &EngineOptions::default());
    assert_eq!(result.outcome, Outcome::OkFallbackRawText);
    assert_eq!(result.total_data_rows, 1);

    let no_ocr = EngineOptions {
        ocr: false,
        ..Default::default()
    };
    assert_eq!(run(&source, &no_ocr).outcome, Outcome::Failed);
}

#[test]
fn mixed_origins_are_plain_ok() {
    let source = MockSource::new(vec![native_statement_page(1), text_page(2, ACME_TEXT)]);
    let result = run(&source, &EngineOptions::default());
    assert_eq!(result.outcome, Outcome::Ok);
    assert_eq!(result.total_data_rows, 2);
}

#[test]
fn upi_statement_blocks() {
    let source = MockSource::new(vec![text_page(
        1,
        "Transaction Statement for 98XXXXXX21\n\
         Jan 05, 2024\n\
         10:32 am\n\
         Paid to Swiggy\n\
         Transaction ID T240105103212\n\
         UTR No. 400512345678\n\
         DEBIT\n\
         ₹250\n\
         Jan 06, 2024\n\
         11:02 pm\n\
         Received from Ravi Kumar\n\
         Transaction ID T240106230211\n\
         CREDIT ₹1,200.50\n\
         Page 1 of 1",
    )]);
    let result = run(&source, &EngineOptions::default());

    assert_eq!(result.outcome, Outcome::Ok);
    let t = &result.tables[0];
    assert_eq!(t.origin, TableOrigin::Format("upi-statement".into()));
    assert_eq!(t.column_count, 7);
    assert_eq!(t.data_row_count(), 2);
    assert_eq!(t.data_rows()[1][2], "Received from Ravi Kumar");
}

#[test]
fn disabled_format_falls_through() {
    let source = MockSource::new(vec![text_page(
        1,
        "UPI Statement\nJan 05, 2024\nPaid to Swiggy\nDEBIT\n₹250",
    )]);
    let options = EngineOptions {
        formats: Some(vec!["txn-date-table".into()]),
        ..Default::default()
    };
    let result = run(&source, &options);
    assert!(result
        .tables
        .iter()
        .all(|t| t.origin != TableOrigin::Format("upi-statement".into())));
}

#[test]
fn txn_date_table_with_wrapped_descriptions() {
    let source = MockSource::new(vec![table_page(
        1,
        vec![table(&[
            &["Txn Date", "Description", "Debit", "Credit", "Balance"],
            &["01 Apr 2024", "NEFT INWARD", "", "10,000.00", "12,000.00"],
            &["", "SALARY APRIL"],
            &["02 Apr 2024", "ATM WDL", "500.00", "", "11,500.00"],
        ])],
    )]);
    let result = run(&source, &EngineOptions::default());

    let t = &result.tables[0];
    assert_eq!(t.origin, TableOrigin::Format("txn-date-table".into()));
    assert_eq!(t.data_row_count(), 2);
    assert_eq!(t.data_rows()[0][1], "NEFT INWARD SALARY APRIL");

    let records = to_records(&result);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].description, "ATM WDL");
}

#[test]
fn ragged_table_taken_by_generic_extractor() {
    let source = MockSource::new(vec![table_page(
        1,
        vec![table(&[
            &["Value Date", "Narration", "Amount"],
            &["03/05/2024", "Interest", "12.40"],
            &["Carried forward"],
        ])],
    )]);
    let result = run(&source, &EngineOptions::default());

    let t = &result.tables[0];
    assert_eq!(t.origin, TableOrigin::GenericTable);
    assert!(t.has_header);
    assert_eq!(t.rows[2], vec!["Carried forward", "", ""]);
    assert_eq!(result.outcome, Outcome::Ok);
}

#[test]
fn two_row_ragged_table_is_kept() {
    let source = MockSource::new(vec![table_page(
        1,
        vec![table(&[
            &["Date", "Description", "Amount"],
            &["01/01/2024", "Coffee 4.50"],
        ])],
    )]);
    let result = run(&source, &EngineOptions::default());

    assert_eq!(result.outcome, Outcome::Ok);
    assert_eq!(result.tables.len(), 1);
    let t = &result.tables[0];
    assert_eq!(t.origin, TableOrigin::GenericTable);
    assert_eq!(t.rows[1], vec!["01/01/2024", "Coffee 4.50", ""]);
    assert!(matches!(
        result.page_reports[0].status,
        PageStatus::Extracted { tables: 1, .. }
    ));
}

#[test]
fn timed_out_page_does_not_fail_document() {
    let mut source = MockSource::new(vec![
        native_statement_page(1),
        native_statement_page(2),
        native_statement_page(3),
    ]);
    source.timed_out.insert(2);
    let result = run(&source, &EngineOptions::default());

    assert_eq!(result.outcome, Outcome::Ok);
    assert_eq!(result.tables.len(), 2);
    assert_eq!(result.tables[0].page_number, 1);
    assert_eq!(result.tables[1].page_number, 3);
    assert_eq!(result.page_reports[1].page_number, 2);
    assert_eq!(result.page_reports[1].status, PageStatus::TimedOut);
    assert_eq!(result.pages_processed, 3);
    assert_eq!(result.total_data_rows, 2);
}

#[test]
fn max_columns_truncates_rightmost() {
    let source = MockSource::new(vec![native_statement_page(1)]);
    let options = EngineOptions {
        max_columns: Some(3),
        ..Default::default()
    };
    let result = run(&source, &options);
    assert_eq!(result.tables[0].column_count, 3);
    assert_eq!(result.tables[0].rows[0], vec!["Date", "Description", "Debit"]);
    assert_eq!(result.truncated_cells, 4);
}

#[test]
fn cancelled_before_start() {
    let source = MockSource::new(vec![native_statement_page(1), native_statement_page(2)]);
    let token = CancellationToken::new();
    token.cancel();

    let result = extract_document(&source, &EngineOptions::default(), &token).unwrap();
    assert_eq!(result.outcome, Outcome::Cancelled);
    assert_eq!(result.pages_processed, 0);
    assert!(result.tables.is_empty());
}

#[test]
fn cancelled_mid_document_keeps_finished_pages() {
    let token = CancellationToken::new();
    let mut source = MockSource::new(vec![
        native_statement_page(1),
        native_statement_page(2),
        native_statement_page(3),
    ]);
    source.cancel_on_first_page = Some(token.clone());
    let options = EngineOptions {
        max_workers: 1,
        ..Default::default()
    };

    let mut sink = RecordingSink::default();
    let summary = convert_with_cancellation(&source, &mut sink, &options, &token);

    assert_eq!(summary.outcome, Outcome::Cancelled);
    assert_eq!(summary.pages_processed, 1);
    assert_eq!(summary.message, "Cancelled after 1 of 3 page(s)");
    assert!(sink.writes.is_empty());
}

// ---------------------------------------------------------------------------
// convert()
// ---------------------------------------------------------------------------
#[test]
fn convert_writes_readable_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("statement.xlsx");
    let source = MockSource::new(vec![native_statement_page(1), text_page(2, ACME_TEXT)]);
    let options = EngineOptions::default();

    let mut sink = XlsxSink::new(&path, options.column_width);
    let summary = convert(&source, &mut sink, &options);

    assert_eq!(summary.outcome, Outcome::Ok);
    assert_eq!(summary.pages_processed, 2);
    assert_eq!(summary.message, "Converted 2 page(s) with 2 transaction(s)");

    let mut workbook: Xlsx<_> = calamine::open_workbook(&path).unwrap();
    let range = workbook.worksheet_range(SHEET_NAME).unwrap();
    assert_eq!(range.get_value((0, 0)), Some(&Data::String("Date".into())));
    assert_eq!(
        range.get_value((1, 3)),
        Some(&Data::String("50,000.00".into()))
    );
    // blank separator row, then the header of page 2
    assert_eq!(range.get_value((3, 1)), Some(&Data::String("Description".into())));
    assert_eq!(range.get_value((4, 1)), Some(&Data::String("Coffee".into())));
}

#[test]
fn convert_reports_fallback_message() {
    let source = MockSource::new(vec![text_page(1, ACME_TEXT)]);
    let mut sink = RecordingSink::default();
    let summary = convert(&source, &mut sink, &EngineOptions::default());

    assert_eq!(summary.outcome, Outcome::OkFallbackRawText);
    assert_eq!(summary.message, "Converted 1 page(s) with 1 row(s) (raw text format)");
    assert_eq!(sink.writes.len(), 1);
}

#[test]
fn convert_without_data_skips_sink() {
    let source = MockSource::new(vec![text_page(1, "Hi"), text_page(2, "")]);
    let mut sink = RecordingSink::default();
    let summary = convert(&source, &mut sink, &EngineOptions::default());

    assert_eq!(summary.outcome, Outcome::Failed);
    assert_eq!(summary.message, "No transaction data found in 2 page(s)");
    assert!(sink.writes.is_empty());
}

#[test]
fn convert_unreadable_document() {
    let mut source = MockSource::new(vec![]);
    source.broken = true;
    let summary = convert(&source, &mut RecordingSink::default(), &EngineOptions::default());

    assert_eq!(summary.outcome, Outcome::Failed);
    assert_eq!(summary.pages_processed, 0);
    assert_eq!(summary.message, "Could not read document: not a PDF");
}

#[test]
fn convert_empty_document() {
    let source = MockSource::new(vec![]);
    let summary = convert(&source, &mut RecordingSink::default(), &EngineOptions::default());
    assert_eq!(summary.outcome, Outcome::Failed);
    assert!(summary.message.starts_with("Could not read document"));
}

#[test]
fn convert_sink_failure() {
    let source = MockSource::new(vec![native_statement_page(1)]);
    let summary = convert(&source, &mut FailingSink, &EngineOptions::default());

    assert_eq!(summary.outcome, Outcome::Failed);
    assert_eq!(summary.pages_processed, 1);
    assert_eq!(summary.message, "Could not write spreadsheet: disk full");
}

#[test]
fn sink_retry_with_same_result() {
    let source = MockSource::new(vec![native_statement_page(1)]);
    let result = run(&source, &EngineOptions::default());

    assert!(FailingSink.write(&result).is_err());
    let bytes = write_xlsx_to_vec(&result, &EngineOptions::default().column_width).unwrap();
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    let range = workbook.worksheet_range(SHEET_NAME).unwrap();
    assert_eq!(range.get_size(), (2, 5));
}
