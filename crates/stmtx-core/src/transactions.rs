//! Flat transaction records derived from normalized tables.
//!
//! Amounts are assigned by position: the first amount in a row is the debit,
//! the second the credit and the third the balance. Nothing checks that the
//! balance column is arithmetically consistent with the others.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::ExtractionResult;
use crate::parsing::tokens::{anchor_tokens, find_amounts, find_date, TokenKind};
use crate::parsing::values::parse_amount;

/// Descriptions longer than this are cut.
pub const MAX_DESCRIPTION_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub page: usize,
    pub date: String,
    pub description: String,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
    pub balance: Option<Decimal>,
}

/// Records for every data row carrying a date and at least one amount.
pub fn to_records(result: &ExtractionResult) -> Vec<TransactionRecord> {
    result
        .tables
        .iter()
        .flat_map(|table| {
            table
                .data_rows()
                .iter()
                .filter_map(move |row| row_to_record(table.page_number, row))
        })
        .collect()
}

fn row_to_record(page: usize, row: &[String]) -> Option<TransactionRecord> {
    let line = row.join("  ");
    let date = find_date(&line)?;
    let amounts = find_amounts(&line);
    if amounts.is_empty() {
        return None;
    }

    let mut positional = amounts.iter().map(|a| parse_amount(a));
    let debit = positional.next().flatten();
    let credit = positional.next().flatten();
    let balance = positional.next().flatten();

    let mut date_taken = false;
    let description = row
        .iter()
        .map(|cell| strip_tokens(cell, &mut date_taken))
        .filter(|cell| !cell.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Some(TransactionRecord {
        page,
        date: date.to_string(),
        description: description.chars().take(MAX_DESCRIPTION_CHARS).collect(),
        debit,
        credit,
        balance,
    })
}

/// Cell text with its amount tokens cut out by span. Only the first date of
/// the row is cut; later dates stay part of the description.
fn strip_tokens(cell: &str, date_taken: &mut bool) -> String {
    let mut kept = String::with_capacity(cell.len());
    let mut cursor = 0;
    for token in anchor_tokens(cell) {
        if token.kind == TokenKind::Date {
            if *date_taken {
                continue;
            }
            *date_taken = true;
        }
        kept.push_str(&cell[cursor..token.start]);
        kept.push(' ');
        cursor = token.end;
    }
    kept.push_str(&cell[cursor..]);
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
