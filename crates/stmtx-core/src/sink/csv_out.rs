use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use crate::error::StmtError;
use crate::model::ExtractionResult;
use crate::sink::{sheet_rows, TableSink};

/// Plain CSV output with the same layout as the spreadsheet, minus styling.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSink { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSink for CsvSink {
    fn write(&mut self, result: &ExtractionResult) -> Result<(), StmtError> {
        let file = std::fs::File::create(&self.path).map_err(|e| {
            StmtError::SinkWrite(format!("{}: {e}", self.path.display()))
        })?;
        write_csv(result, file)
    }
}

pub fn write_csv_to_string(result: &ExtractionResult) -> Result<String, StmtError> {
    let mut buf = Vec::new();
    write_csv(result, &mut buf)?;
    String::from_utf8(buf).map_err(|e| StmtError::SinkWrite(format!("invalid utf-8 csv output: {e}")))
}

fn write_csv<W: Write>(result: &ExtractionResult, out: W) -> Result<(), StmtError> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(out);
    let rows = sheet_rows(result);

    for (i, row) in rows.iter().enumerate() {
        if row.is_separator() {
            let width = rows.get(i + 1).map_or(1, |next| next.cells.len().max(1));
            writer
                .write_record(vec![""; width])
                .map_err(|e| StmtError::SinkWrite(e.to_string()))?;
        } else {
            writer
                .write_record(&row.cells)
                .map_err(|e| StmtError::SinkWrite(e.to_string()))?;
        }
    }
    writer
        .flush()
        .map_err(|e| StmtError::SinkWrite(e.to_string()))?;
    Ok(())
}
