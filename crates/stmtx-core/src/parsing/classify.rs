use crate::parsing::tokens::{has_amount, has_date};

/// Lines shorter than this are labels, page numbers or blanks.
pub const MIN_TRANSACTION_LINE_LEN: usize = 10;

/// Decide whether a line plausibly encodes a transaction.
///
/// A line qualifies when it carries a date token or an amount token anywhere
/// in it. Short lines are rejected before any pattern matching.
pub fn is_transaction_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.chars().count() < MIN_TRANSACTION_LINE_LEN {
        return false;
    }
    has_date(trimmed) || has_amount(trimmed)
}
