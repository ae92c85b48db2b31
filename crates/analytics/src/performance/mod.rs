//! 回测汇总统计模块

mod summary;

pub use summary::{BacktestSummary, SymbolPnl, TOP_SYMBOLS};
