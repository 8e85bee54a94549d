use crate::extraction::PageContent;
use crate::model::{CandidateTable, TableOrigin};
use crate::parsing::header::locate_header_row;

/// Rows of a detected table with the blank ones removed.
pub(crate) fn non_blank_rows(table: &[Vec<String>]) -> Vec<Vec<String>> {
    table
        .iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .cloned()
        .collect()
}

/// Build a candidate, dropping rows above a located column header.
pub(crate) fn table_candidate(
    page_number: usize,
    mut rows: Vec<Vec<String>>,
    origin: TableOrigin,
) -> CandidateTable {
    let has_header = match locate_header_row(&rows) {
        Some(index) => {
            rows.drain(..index);
            true
        }
        None => false,
    };
    CandidateTable::new(page_number, rows, origin, has_header)
}

fn is_uniform(rows: &[Vec<String>]) -> bool {
    rows.windows(2).all(|pair| pair[0].len() == pair[1].len())
}

/// Pre-detected tables that form a clean grid: at least two rows, every row
/// with the same number of cells.
pub fn extract_native_tables(page: &PageContent) -> Vec<CandidateTable> {
    page.tables
        .iter()
        .map(|table| non_blank_rows(table))
        .filter(|rows| rows.len() >= 2 && is_uniform(rows))
        .map(|rows| table_candidate(page.page_number, rows, TableOrigin::NativeTable))
        .collect()
}

/// Catch-all for pre-detected tables with at least two rows, ragged or not.
pub fn extract_generic_tables(page: &PageContent) -> Vec<CandidateTable> {
    page.tables
        .iter()
        .map(|table| non_blank_rows(table))
        .filter(|rows| rows.len() >= 2)
        .map(|rows| table_candidate(page.page_number, rows, TableOrigin::GenericTable))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::RawTable;

    fn table(rows: &[&[&str]]) -> RawTable {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn page(tables: Vec<RawTable>) -> PageContent {
        PageContent {
            page_number: 1,
            lines: vec![],
            tables,
        }
    }

    #[test]
    fn test_native_accepts_clean_grid() {
        let p = page(vec![table(&[
            &["Date", "Description", "Debit", "Credit", "Balance"],
            &["", "", "", "", ""],
            &["01/01/2024", "Salary", "", "50,000.00", "50,000.00"],
        ])]);
        let tables = extract_native_tables(&p);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 2);
        assert!(tables[0].has_header);
        assert_eq!(tables[0].origin, TableOrigin::NativeTable);
    }

    #[test]
    fn test_native_rejects_ragged_and_single_row() {
        let p = page(vec![
            table(&[&["a", "b"], &["c"]]),
            table(&[&["only", "row"]]),
        ]);
        assert!(extract_native_tables(&p).is_empty());
    }

    #[test]
    fn test_rows_above_header_dropped() {
        let p = page(vec![table(&[
            &["Account 0042", ""],
            &["Date", "Amount"],
            &["01/01/2024", "5.00"],
        ])]);
        let tables = extract_native_tables(&p);
        assert_eq!(tables[0].rows[0], vec!["Date", "Amount"]);
        assert_eq!(tables[0].rows.len(), 2);
    }

    #[test]
    fn test_generic_takes_ragged_tables() {
        let p = page(vec![table(&[&["x", "y", "z"], &["1"], &["2", "3"]])]);
        let tables = extract_generic_tables(&p);
        assert_eq!(tables.len(), 1);
        assert!(!tables[0].has_header);
        assert_eq!(tables[0].origin, TableOrigin::GenericTable);
    }

    #[test]
    fn test_generic_takes_two_row_ragged_table() {
        let p = page(vec![table(&[
            &["Date", "Description", "Amount"],
            &["01/01/2024", "Coffee 4.50"],
        ])]);
        let tables = extract_generic_tables(&p);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 2);
        assert!(tables[0].has_header);
    }

    #[test]
    fn test_generic_needs_two_rows() {
        let p = page(vec![table(&[&["x", "y", "z"], &["", ""], &["1"]])]);
        assert_eq!(extract_generic_tables(&p).len(), 1);
        let p = page(vec![table(&[&["x", "y", "z"], &["", ""]])]);
        assert!(extract_generic_tables(&p).is_empty());
    }
}
