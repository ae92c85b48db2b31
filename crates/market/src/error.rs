//! K线加载错误

use rust_scalp_domain::CandleError;
use thiserror::Error;

/// 单个K线表加载失败的原因
///
/// 除 `DataRootMissing` 外都只影响单个标的
#[derive(Debug, Error)]
pub enum CandleLoadError {
    #[error("数据目录不存在: {0}")]
    DataRootMissing(String),

    #[error("未找到标的K线表: {0}")]
    InstrumentNotFound(String),

    #[error("缺少必需列: {0}")]
    MissingColumn(&'static str),

    #[error("列类型不支持: column={column}, type={data_type}")]
    UnsupportedColumnType { column: String, data_type: String },

    #[error("数据解析失败: row={row}, column={column}, value={value}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("K线数据非法: {0}")]
    InvalidCandle(#[from] CandleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
