use std::path::PathBuf;
use std::process::ExitCode;

use stmtx_core::engine::{summarize, CancellationToken};
use stmtx_core::error::StmtError;
use stmtx_core::transactions::to_records;

use crate::commands::open_source;
use crate::output;
use crate::EngineArgs;

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    transactions: bool,
    engine: &EngineArgs,
) -> Result<ExitCode, StmtError> {
    let options = engine.resolve()?;
    let source = open_source(&input_file, &options)?;
    let result =
        stmtx_core::extract_document(source.as_ref(), &options, &CancellationToken::new())?;

    match (output_format, transactions) {
        ("json", true) => output::json::print(&to_records(&result))?,
        ("json", false) => output::json::print(&result)?,
        (_, true) => print!("{}", output::table::format_records(&to_records(&result))),
        (_, false) => print!("{}", output::table::format_result(&result)),
    }
    eprintln!("{}", summarize(&result));

    if result.outcome.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}
