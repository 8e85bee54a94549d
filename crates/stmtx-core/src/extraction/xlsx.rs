use std::io::Cursor;

use calamine::{Data, DataType, Reader, Xlsx};

use crate::error::StmtError;
use crate::extraction::{DocumentSource, PageContent, RawTable};

/// Spreadsheet statement exports: each worksheet is one page whose used
/// range is a single pre-detected table.
pub struct XlsxSource {
    sheets: Vec<(String, RawTable)>,
}

impl XlsxSource {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StmtError> {
        let cursor = Cursor::new(bytes);
        let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
            .map_err(|e| StmtError::DocumentUnreadable(format!("failed to open xlsx: {e}")))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name).map_err(|e| {
                StmtError::DocumentUnreadable(format!("sheet '{name}' unreadable: {e}"))
            })?;
            let rows = range
                .rows()
                .map(|row| row.iter().map(cell_as_string).collect())
                .collect();
            sheets.push((name, rows));
        }

        Ok(XlsxSource { sheets })
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl DocumentSource for XlsxSource {
    fn page_count(&self) -> Result<usize, StmtError> {
        Ok(self.sheets.len())
    }

    fn page_content(&self, page_number: usize) -> Result<PageContent, StmtError> {
        let (_, rows) = page_number
            .checked_sub(1)
            .and_then(|i| self.sheets.get(i))
            .ok_or_else(|| StmtError::PageUnreadable {
                page: page_number,
                reason: format!("workbook has {} sheet(s)", self.sheets.len()),
            })?;

        let lines = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .collect::<Vec<_>>()
                    .join("  ")
            })
            .collect();

        let tables = if rows.is_empty() {
            Vec::new()
        } else {
            vec![rows.clone()]
        };

        Ok(PageContent {
            page_number,
            lines,
            tables,
        })
    }

    fn backend_name(&self) -> &str {
        "xlsx"
    }
}

/// Render a cell the way a text layer would show it, so numeric and date
/// cells keep the shape the amount and date patterns look for.
fn cell_as_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
            Some(date) => date.format("%d/%m/%Y").to_string(),
            None => format!("{cell}"),
        },
        Data::Empty => String::new(),
        _ => format!("{cell}"),
    }
}

/// Values with at most two decimals are written with exactly two.
fn format_number(value: f64) -> String {
    let cents = value * 100.0;
    if value.is_finite() && (cents - cents.round()).abs() < 1e-6 {
        format!("{value:.2}")
    } else {
        value.to_string()
    }
}
