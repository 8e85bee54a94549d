pub mod classify;
pub mod header;
pub mod split;
pub mod tokens;
pub mod values;

pub use classify::is_transaction_line;
pub use header::{locate_header, statement_start};
pub use split::split_line;
