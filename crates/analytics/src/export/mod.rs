//! 交易明细导出

mod ledger;

pub use ledger::{write_ledger, write_ledger_csv, LedgerRow, DEFAULT_LEDGER_PATH};
