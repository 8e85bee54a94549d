//! Multi-line UPI payment-app statements.
//!
//! Each transaction spans several lines:
//!
//! ```text
//! Jan 05, 2024
//! 10:32 am
//! Paid to Swiggy
//! Transaction ID T240105103212
//! UTR No. 400512345678
//! DEBIT
//! ₹250
//! ```
//!
//! Lines are fed through a small state machine; a block ends at the next
//! date line, at an end-of-page marker, or at the end of the page.

use regex::Regex;
use std::sync::LazyLock;

use crate::extraction::PageContent;
use crate::model::{CandidateTable, TableOrigin};
use crate::parsing::values::parse_amount;

pub const NAME: &str = "upi-statement";

const MARKERS: &[&str] = &["transaction statement for", "upi statement"];

const ENTITY_PREFIXES: &[&str] = &[
    "paid to",
    "received from",
    "transfer to",
    "transfer from",
    "payment to",
    "bill paid",
    "mobile recharged",
];

pub const COLUMNS: [&str; 7] = [
    "Date",
    "Time",
    "Transaction Details",
    "Transaction ID",
    "UTR No",
    "Type",
    "Amount",
];

static BLOCK_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*(?:\d{1,2}[/-]\d{1,2}[/-]\d{4}",
        r"|\d{1,2}\s+(?i:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*)\s+\d{4}",
        r"|(?i:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*)\s+\d{1,2},?\s+\d{4})\b"
    ))
    .expect("block date pattern is valid")
});

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d{1,2}:\d{2}(?::\d{2})?(?:\s*(?i:am|pm))?\b").expect("time pattern is valid")
});

static END_OF_PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:page\s+\d+(?:\s+of\s+\d+)?\s*$|this is a system generated statement|disclaimer)")
        .expect("end-of-page pattern is valid")
});

static TXN_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btransaction\s+id\s*:?\s*([A-Za-z0-9]+)").expect("txn id pattern is valid")
});

static UTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\butr\b(?:\s*(?:no\.?|number))?\s*:?\s*([A-Za-z0-9]+)")
        .expect("utr pattern is valid")
});

/// Direction keyword standing alone or directly before the amount.
static DIRECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(DEBIT|CREDIT)\b\s*(?:$|₹|INR|Rs)").expect("direction pattern is valid")
});

static CURRENCY_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:₹|\bINR|\bRs\.?)\s*(-?\d[\d,]*(?:\.\d{1,2})?)").expect("amount pattern is valid")
});

pub fn matches(page: &PageContent) -> bool {
    let text = page.text_lowercase();
    MARKERS.iter().any(|marker| text.contains(marker))
}

pub fn parse(page: &PageContent) -> Vec<CandidateTable> {
    let blocks = scan_blocks(&page.lines);
    if blocks.is_empty() {
        return Vec::new();
    }

    let mut rows = Vec::with_capacity(blocks.len() + 1);
    rows.push(COLUMNS.iter().map(|c| c.to_string()).collect());
    rows.extend(blocks.into_iter().map(UpiBlock::into_row));

    vec![CandidateTable::new(
        page.page_number,
        rows,
        TableOrigin::Format(NAME.to_string()),
        true,
    )]
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct UpiBlock {
    date: String,
    time: Option<String>,
    details: Option<String>,
    transaction_id: Option<String>,
    utr: Option<String>,
    direction: Option<String>,
    amount: Option<String>,
}

impl UpiBlock {
    fn new(date: &str) -> Self {
        UpiBlock {
            date: date.trim().to_string(),
            ..Default::default()
        }
    }

    fn has_details(&self) -> bool {
        self.details.is_some()
            || self.transaction_id.is_some()
            || self.utr.is_some()
            || self.direction.is_some()
            || self.amount.is_some()
    }

    /// Fill whatever labelled fields this line carries. First value wins.
    fn absorb(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        // Where the trailing direction/amount part of a combined line starts.
        let mut tail_start = line.len();

        if let Some(caps) = CURRENCY_AMOUNT_RE.captures(line) {
            let whole = caps.get(0).map_or(0, |m| m.start());
            tail_start = tail_start.min(whole);
            if self.amount.is_none() && parse_amount(&caps[1]).is_some() {
                self.amount = Some(caps[1].to_string());
            }
        }
        if let Some(caps) = DIRECTION_RE.captures(line) {
            if let Some(m) = caps.get(1) {
                tail_start = tail_start.min(m.start());
                if self.direction.is_none() {
                    self.direction = Some(m.as_str().to_string());
                }
            }
        }
        if let Some(caps) = TXN_ID_RE.captures(line) {
            if self.transaction_id.is_none() {
                self.transaction_id = Some(caps[1].to_string());
            }
            return;
        }
        if let Some(caps) = UTR_RE.captures(line) {
            if self.utr.is_none() {
                self.utr = Some(caps[1].to_string());
            }
            return;
        }

        let lower = line.to_lowercase();
        if self.details.is_none() && ENTITY_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            let entity = line[..tail_start].trim();
            if !entity.is_empty() {
                self.details = Some(entity.to_string());
            }
        }
    }

    fn into_row(self) -> Vec<String> {
        vec![
            self.date,
            self.time.unwrap_or_default(),
            self.details.unwrap_or_default(),
            self.transaction_id.unwrap_or_default(),
            self.utr.unwrap_or_default(),
            self.direction.unwrap_or_default(),
            self.amount.unwrap_or_default(),
        ]
    }
}

/// Scanner state. A completed block is handed back from `step` rather than
/// held in a state of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    SeekingDate,
    SeekingTime(UpiBlock),
    CollectingDetails(UpiBlock),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    EndOfPage,
    /// Byte offset where the date token ends.
    Date(usize),
    Other,
}

fn classify(line: &str) -> LineKind {
    if line.trim().is_empty() {
        LineKind::Blank
    } else if END_OF_PAGE_RE.is_match(line) {
        LineKind::EndOfPage
    } else if let Some(m) = BLOCK_DATE_RE.find(line) {
        LineKind::Date(m.end())
    } else {
        LineKind::Other
    }
}

/// Start a block from a date line; text after the date is detail.
fn open_block(line: &str, date_end: usize) -> ScanState {
    let mut block = UpiBlock::new(&line[..date_end]);
    let rest = line[date_end..].trim();
    if rest.is_empty() {
        return ScanState::SeekingTime(block);
    }
    if let Some(m) = TIME_RE.find(rest) {
        block.time = Some(m.as_str().trim().to_string());
        block.absorb(&rest[m.end()..]);
    } else {
        block.absorb(rest);
    }
    ScanState::CollectingDetails(block)
}

/// Complete a block; blocks that never gained a detail are dropped.
fn finish(block: UpiBlock) -> Option<UpiBlock> {
    block.has_details().then_some(block)
}

fn step(state: ScanState, line: &str) -> (ScanState, Option<UpiBlock>) {
    let kind = classify(line);
    match (state, kind) {
        (state, LineKind::Blank) => (state, None),

        (ScanState::SeekingDate, LineKind::Date(end)) => (open_block(line, end), None),
        (ScanState::SeekingDate, _) => (ScanState::SeekingDate, None),

        (ScanState::SeekingTime(block) | ScanState::CollectingDetails(block), LineKind::Date(end)) => {
            (open_block(line, end), finish(block))
        }
        (ScanState::SeekingTime(block) | ScanState::CollectingDetails(block), LineKind::EndOfPage) => {
            (ScanState::SeekingDate, finish(block))
        }

        (ScanState::SeekingTime(mut block), LineKind::Other) => {
            match TIME_RE.find(line) {
                Some(m) => {
                    block.time = Some(m.as_str().trim().to_string());
                    block.absorb(&line[m.end()..]);
                }
                None => block.absorb(line),
            }
            (ScanState::CollectingDetails(block), None)
        }
        (ScanState::CollectingDetails(mut block), LineKind::Other) => {
            block.absorb(line);
            (ScanState::CollectingDetails(block), None)
        }
    }
}

fn scan_blocks(lines: &[String]) -> Vec<UpiBlock> {
    let mut blocks = Vec::new();
    let mut state = ScanState::SeekingDate;

    for line in lines {
        let (next, completed) = step(state, line);
        blocks.extend(completed);
        state = next;
    }

    match state {
        ScanState::SeekingTime(block) | ScanState::CollectingDetails(block) => {
            blocks.extend(finish(block));
        }
        ScanState::SeekingDate => {}
    }

    blocks
}
