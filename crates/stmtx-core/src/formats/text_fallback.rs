use crate::extraction::PageContent;
use crate::model::{CandidateTable, TableOrigin};
use crate::parsing::header::locate_header;
use crate::parsing::split::split_header_line;
use crate::parsing::{is_transaction_line, split_line};

/// Minimum columns a split line needs to be kept as a row.
const MIN_COLUMNS: usize = 2;

/// Build a table from raw page lines.
///
/// Lines before the column header are skipped and classification starts at
/// the header line. A header line that is not itself transaction-like is
/// split on its own and leads the table; otherwise the first accepted line
/// takes its place.
pub fn extract_from_text(page: &PageContent) -> Vec<CandidateTable> {
    let header = locate_header(&page.lines);
    let start = header.unwrap_or(0);

    let accepted: Vec<(usize, Vec<String>)> = page.lines[start..]
        .iter()
        .enumerate()
        .filter(|(_, line)| is_transaction_line(line))
        .map(|(offset, line)| (start + offset, split_line(line)))
        .filter(|(_, columns)| columns.len() >= MIN_COLUMNS)
        .collect();

    if accepted.is_empty() {
        return Vec::new();
    }
    let header_is_data = header.is_some_and(|index| accepted[0].0 == index);

    let mut rows = Vec::with_capacity(accepted.len() + 1);
    if let Some(index) = header.filter(|_| !header_is_data) {
        rows.push(split_header_line(&page.lines[index]));
    }
    rows.extend(accepted.into_iter().map(|(_, columns)| columns));

    vec![CandidateTable::new(
        page.page_number,
        rows,
        TableOrigin::TextFallback,
        true,
    )]
}
