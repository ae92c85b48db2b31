use thiserror::Error;

/// 加仓过滤错误，任何一条都使整个准入序列失效
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PyramidError {
    #[error("加仓参数非法: {0}")]
    InvalidPolicy(String),

    #[error("开仓价非法: symbol={symbol}, entry_ts={entry_timestamp}, price={price}")]
    InvalidEntryPrice {
        symbol: String,
        entry_timestamp: i64,
        price: f64,
    },

    #[error("平仓时间早于开仓时间: symbol={symbol}, entry_ts={entry_timestamp}, exit_ts={exit_timestamp}")]
    ExitBeforeEntry {
        symbol: String,
        entry_timestamp: i64,
        exit_timestamp: i64,
    },
}
