use crate::error::StmtError;
use crate::formats::{txn_table, upi, BankFormat};

/// Names of the built-in bank formats, in chain order.
pub const BUILTIN_FORMATS: &[&str] = &[txn_table::NAME, upi::NAME];

/// All built-in bank formats, in chain order.
pub fn builtin_formats() -> Vec<BankFormat> {
    BUILTIN_FORMATS
        .iter()
        .filter_map(|name| load_format(name).ok())
        .collect()
}

/// Look up a built-in bank format by name.
pub fn load_format(name: &str) -> Result<BankFormat, StmtError> {
    match name {
        txn_table::NAME => Ok(BankFormat {
            name: txn_table::NAME,
            description: "Tabular export with a 'Txn Date ... Balance' header and wrapped descriptions",
            signature: txn_table::matches,
            parse: txn_table::parse,
        }),
        upi::NAME => Ok(BankFormat {
            name: upi::NAME,
            description: "UPI payment-app statement with one multi-line block per transaction",
            signature: upi::matches,
            parse: upi::parse,
        }),
        _ => Err(StmtError::ConfigInvalid(format!(
            "unknown bank format '{}'. Available: {}",
            name,
            BUILTIN_FORMATS.join(", ")
        ))),
    }
}
