//! K线表文件读取

pub mod csv_reader;
pub mod parquet_reader;

pub use csv_reader::read_csv_table;
pub use parquet_reader::read_parquet_table;

use crate::error::CandleLoadError;

/// 时间列候选名，按优先级排列
pub const TIME_COLUMNS: [&str; 4] = ["open_time", "ts_1s", "timestamp", "time"];

/// 列位置映射
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnLayout {
    pub open: usize,
    pub high: usize,
    pub low: usize,
    pub close: usize,
    /// 无时间列时用行号代替
    pub time: Option<usize>,
}

impl ColumnLayout {
    pub fn resolve(names: &[&str]) -> Result<Self, CandleLoadError> {
        let find = |name: &'static str| {
            names
                .iter()
                .position(|n| n.trim() == name)
                .ok_or(CandleLoadError::MissingColumn(name))
        };
        let time = TIME_COLUMNS
            .iter()
            .find_map(|candidate| names.iter().position(|n| n.trim() == *candidate));

        Ok(Self {
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
            time,
        })
    }
}
