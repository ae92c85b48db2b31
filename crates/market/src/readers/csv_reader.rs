//! CSV K线表读取
//!
//! 首行为表头，时间列为整数毫秒

use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use rust_scalp_domain::{Candle, CandleTable};

use super::ColumnLayout;
use crate::error::CandleLoadError;

/// 读取单个 csv 文件为K线表
pub fn read_csv_table(path: &Path, instrument_id: &str) -> Result<CandleTable, CandleLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let names: Vec<&str> = headers.iter().collect();
    let layout = ColumnLayout::resolve(&names)?;

    let mut candles = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let timestamp = match layout.time {
            Some(idx) => parse_field::<i64>(&record, idx, row, "time")?,
            None => row as i64,
        };
        candles.push(Candle::new(
            timestamp,
            parse_field(&record, layout.open, row, "open")?,
            parse_field(&record, layout.high, row, "high")?,
            parse_field(&record, layout.low, row, "low")?,
            parse_field(&record, layout.close, row, "close")?,
        ));
    }

    debug!(
        "csv 读取完成: inst_id={}, rows={}, path={}",
        instrument_id,
        candles.len(),
        path.display()
    );
    Ok(CandleTable::new(instrument_id, candles)?)
}

fn parse_field<T: std::str::FromStr>(
    record: &StringRecord,
    idx: usize,
    row: usize,
    column: &'static str,
) -> Result<T, CandleLoadError> {
    let raw = record.get(idx).unwrap_or_default();
    raw.parse::<T>().map_err(|_| CandleLoadError::InvalidValue {
        row,
        column,
        value: raw.to_string(),
    })
}
