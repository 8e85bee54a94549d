use serde::Serialize;
use stmtx_core::error::StmtError;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), StmtError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
