//! # Rust Scalp Market
//!
//! 市场数据：K线表发现、加载（parquet / csv）与内存数据源
//!
//! ## 核心组件
//! - [`CandleSource`]: K线表数据源抽象，按标的逐个加载
//! - [`FileCandleSource`]: 目录下 `SYMBOL_TF.parquet|csv` 文件
//! - [`MemoryCandleSource`]: 内存中的K线表，测试与嵌入调用使用

pub mod error;
pub mod readers;
pub mod repositories;

pub use error::CandleLoadError;
pub use repositories::{matches_timeframe, CandleSource, FileCandleSource, MemoryCandleSource};
