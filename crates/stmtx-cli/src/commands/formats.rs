use std::process::ExitCode;

use stmtx_core::error::StmtError;
use stmtx_core::formats::builtin;

pub fn list() -> Result<ExitCode, StmtError> {
    println!("Built-in bank formats (tried in this order):\n");
    for name in builtin::BUILTIN_FORMATS {
        let format = builtin::load_format(name)?;
        println!("  {:<16} {}", format.name, format.description);
    }
    println!();
    println!("Pages matching none of these fall back to generic table and raw text extraction.");
    Ok(ExitCode::SUCCESS)
}
