use crate::model::{CandidateTable, NormalizedTable};

/// Pad every row of a candidate table to a common column count.
///
/// The column count is the widest row. When `max_columns` is set and the
/// widest row exceeds it, the rightmost cells are dropped and counted in
/// `truncated_cells`. Rows are never reordered, added or removed.
///
/// Returns None for tables with no rows or no non-blank cell.
pub fn normalize_table(
    candidate: &CandidateTable,
    max_columns: Option<usize>,
) -> Option<NormalizedTable> {
    if candidate.rows.is_empty() || !candidate.has_content() {
        return None;
    }

    let widest = candidate.rows.iter().map(Vec::len).max().unwrap_or(0);
    let column_count = match max_columns {
        Some(limit) => widest.min(limit),
        None => widest,
    };

    let mut truncated_cells = 0;
    let rows = candidate
        .rows
        .iter()
        .map(|row| {
            let mut out = row.clone();
            if out.len() > column_count {
                truncated_cells += out.len() - column_count;
                out.truncate(column_count);
            }
            out.resize(column_count, String::new());
            out
        })
        .collect();

    Some(NormalizedTable {
        page_number: candidate.page_number,
        rows,
        column_count,
        origin: candidate.origin.clone(),
        has_header: candidate.has_header,
        truncated_cells,
    })
}
