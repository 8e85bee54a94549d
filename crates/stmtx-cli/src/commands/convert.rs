use std::path::PathBuf;
use std::process::ExitCode;

use stmtx_core::error::StmtError;
use stmtx_core::sink::{CsvSink, TableSink, XlsxSink};

use crate::commands::open_source;
use crate::EngineArgs;

pub fn run(
    input_file: PathBuf,
    out: PathBuf,
    sink_kind: Option<&str>,
    engine: &EngineArgs,
) -> Result<ExitCode, StmtError> {
    let options = engine.resolve()?;
    let source = open_source(&input_file, &options)?;

    let kind = match sink_kind {
        Some(kind) => kind.to_lowercase(),
        None => out
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .filter(|e| e == "csv")
            .unwrap_or_else(|| "xlsx".into()),
    };
    let mut sink: Box<dyn TableSink> = match kind.as_str() {
        "xlsx" => Box::new(XlsxSink::new(&out, options.column_width)),
        "csv" => Box::new(CsvSink::new(&out)),
        other => {
            return Err(StmtError::ConfigInvalid(format!(
                "unknown sink '{other}' (expected 'xlsx' or 'csv')"
            )))
        }
    };

    let summary = stmtx_core::convert(source.as_ref(), sink.as_mut(), &options);
    println!("{}", summary.message);

    if summary.outcome.is_success() {
        eprintln!("Written to {}", out.display());
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}
