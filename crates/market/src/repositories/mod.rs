//! K线表数据源

pub mod file_candle_source;
pub mod memory_candle_source;

pub use file_candle_source::FileCandleSource;
pub use memory_candle_source::MemoryCandleSource;

use rust_scalp_domain::CandleTable;

use crate::error::CandleLoadError;

/// K线表数据源
///
/// 每个标的对应一张独立的K线表，互不依赖，可在任意线程加载
pub trait CandleSource: Send + Sync {
    /// 列出可用标的（按标识排序），`timeframe` 为周期过滤标签
    fn list_instruments(&self, timeframe: Option<&str>) -> Result<Vec<String>, CandleLoadError>;

    /// 加载单个标的K线表
    fn load(&self, instrument_id: &str) -> Result<CandleTable, CandleLoadError>;
}

/// 周期过滤：标识最后一个 `_` 之后的后缀等于标签
///
/// `BTCUSDT_30s` 匹配 `30s`，不匹配 `1m`；没有后缀的标识不匹配任何标签
pub fn matches_timeframe(instrument_id: &str, timeframe: &str) -> bool {
    instrument_id
        .rsplit_once('_')
        .map(|(_, suffix)| suffix == timeframe)
        .unwrap_or(false)
}
