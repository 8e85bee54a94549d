//! Tabular exports whose header reads "Txn Date ... Balance".
//!
//! These statements wrap long descriptions onto continuation rows that carry
//! no date; such rows are folded into the transaction above them.

use crate::extraction::{PageContent, RawTable};
use crate::formats::native::non_blank_rows;
use crate::model::{CandidateTable, TableOrigin};

pub const NAME: &str = "txn-date-table";

fn is_txn_header(row: &[String]) -> bool {
    let lower = row.join(" ").to_lowercase();
    lower.contains("txn date") && lower.contains("balance")
}

fn header_index(table: &RawTable) -> Option<usize> {
    table.iter().position(|row| is_txn_header(row))
}

pub fn matches(page: &PageContent) -> bool {
    page.tables.iter().any(|t| header_index(t).is_some())
}

pub fn parse(page: &PageContent) -> Vec<CandidateTable> {
    page.tables
        .iter()
        .filter_map(|table| {
            let start = header_index(table)?;
            let rows = merge_continuations(non_blank_rows(&table[start..]));
            Some(CandidateTable::new(
                page.page_number,
                rows,
                TableOrigin::Format(NAME.to_string()),
                true,
            ))
        })
        .collect()
}

/// Fold rows with an empty date cell into the previous data row.
fn merge_continuations(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut out: Vec<Vec<String>> = Vec::with_capacity(rows.len());

    for row in rows {
        let is_continuation =
            out.len() > 1 && row.first().map_or(true, |cell| cell.trim().is_empty());
        if !is_continuation {
            out.push(row);
            continue;
        }

        if let Some(prev) = out.last_mut() {
            for (i, cell) in row.iter().enumerate() {
                let cell = cell.trim();
                if cell.is_empty() {
                    continue;
                }
                match prev.get_mut(i) {
                    Some(existing) if !existing.trim().is_empty() => {
                        *existing = format!("{} {}", existing.trim(), cell);
                    }
                    Some(existing) => *existing = cell.to_string(),
                    None => {
                        prev.resize(i, String::new());
                        prev.push(cell.to_string());
                    }
                }
            }
        }
    }

    out
}
