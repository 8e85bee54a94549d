pub mod csv_out;
pub mod xlsx;

use crate::config::ColumnWidthPolicy;
use crate::error::StmtError;
use crate::model::ExtractionResult;

pub use csv_out::CsvSink;
pub use xlsx::XlsxSink;

/// Destination for an extraction result.
pub trait TableSink {
    fn write(&mut self, result: &ExtractionResult) -> Result<(), StmtError>;
}

/// One output row. Separator rows have no cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub cells: Vec<String>,
    pub is_header: bool,
}

impl SheetRow {
    pub fn is_separator(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Lay out all tables on one sheet, in page order, with a blank row between
/// consecutive tables.
pub fn sheet_rows(result: &ExtractionResult) -> Vec<SheetRow> {
    let mut out = Vec::new();
    for (i, table) in result.tables.iter().enumerate() {
        if i > 0 {
            out.push(SheetRow {
                cells: Vec::new(),
                is_header: false,
            });
        }
        for (r, row) in table.rows.iter().enumerate() {
            out.push(SheetRow {
                cells: row.clone(),
                is_header: table.has_header && r == 0,
            });
        }
    }
    out
}

/// Widest cell text per column, in characters, clamped to the policy.
pub fn column_widths(rows: &[SheetRow], policy: &ColumnWidthPolicy) -> Vec<f64> {
    let mut widest: Vec<usize> = Vec::new();
    for row in rows {
        if widest.len() < row.cells.len() {
            widest.resize(row.cells.len(), 0);
        }
        for (i, cell) in row.cells.iter().enumerate() {
            widest[i] = widest[i].max(cell.chars().count());
        }
    }
    widest
        .into_iter()
        .map(|chars| policy.clamp(chars as f64))
        .collect()
}
