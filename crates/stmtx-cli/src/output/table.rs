use std::fmt::Display;

use stmtx_core::model::{ExtractionResult, PageStatus};
use stmtx_core::transactions::TransactionRecord;

/// Format extracted tables as aligned text, one block per table.
pub fn format_result(result: &ExtractionResult) -> String {
    let mut out = String::new();

    for table in &result.tables {
        out.push_str(&format!(
            "=== Page {} ({}) ===\n\n",
            table.page_number, table.origin
        ));

        let widths: Vec<usize> = (0..table.column_count)
            .map(|c| {
                table
                    .rows
                    .iter()
                    .map(|row| row[c].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for (r, row) in table.rows.iter().enumerate() {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            out.push_str(&format!("  {}\n", line.trim_end()));

            if r == 0 && table.has_header {
                let rule: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
                out.push_str(&format!("  {}\n", "-".repeat(rule)));
            }
        }
        out.push('\n');
    }

    let problems: Vec<String> = result
        .page_reports
        .iter()
        .filter_map(|report| match report.status {
            PageStatus::Unreadable { ref reason } => {
                Some(format!("page {}: {}", report.page_number, reason))
            }
            PageStatus::TimedOut => Some(format!("page {}: timed out", report.page_number)),
            _ => None,
        })
        .collect();
    if !problems.is_empty() {
        out.push_str("Skipped pages:\n");
        for p in &problems {
            out.push_str(&format!("  - {p}\n"));
        }
        out.push('\n');
    }

    out
}

/// Format positional records as a fixed-width listing.
pub fn format_records(records: &[TransactionRecord]) -> String {
    let mut out = format!(
        "  {:<4}  {:<12}  {:<40}  {:>12}  {:>12}  {:>12}\n",
        "Page", "Date", "Description", "Debit", "Credit", "Balance"
    );
    out.push_str(&format!("  {}\n", "-".repeat(4 + 12 + 40 + 12 * 3 + 10)));

    for record in records {
        let description: String = record.description.chars().take(40).collect();
        out.push_str(&format!(
            "  {:<4}  {:<12}  {:<40}  {:>12}  {:>12}  {:>12}\n",
            record.page,
            record.date,
            description,
            amount(record.debit),
            amount(record.credit),
            amount(record.balance),
        ));
    }
    out
}

fn amount<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
