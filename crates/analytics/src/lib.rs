//! # Rust Scalp Analytics
//!
//! 回测结果汇总与导出
//!
//! ## 核心组件
//! - `performance`: 胜率、总/平均盈亏、最大回撤、分层与分标的统计
//! - `export`: 交易明细 CSV

pub mod export;
pub mod performance;

pub use export::{write_ledger, write_ledger_csv, LedgerRow, DEFAULT_LEDGER_PATH};
pub use performance::{BacktestSummary, SymbolPnl};
