//! Parquet K线表读取
//!
//! 价格列接受任意数值类型（统一转换为 Float64），
//! 时间列支持整数毫秒、Date64 以及各精度的 Timestamp，统一换算为毫秒

use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::debug;

use rust_scalp_domain::{Candle, CandleTable};

use super::ColumnLayout;
use crate::error::CandleLoadError;

/// 读取单个 parquet 文件为K线表
pub fn read_parquet_table(path: &Path, instrument_id: &str) -> Result<CandleTable, CandleLoadError> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut candles = Vec::new();
    let mut row_offset = 0usize;

    for batch_result in reader {
        let batch = batch_result?;
        append_batch(&batch, row_offset, &mut candles)?;
        row_offset += batch.num_rows();
    }

    debug!(
        "parquet 读取完成: inst_id={}, rows={}, path={}",
        instrument_id,
        candles.len(),
        path.display()
    );
    Ok(CandleTable::new(instrument_id, candles)?)
}

fn append_batch(
    batch: &RecordBatch,
    row_offset: usize,
    candles: &mut Vec<Candle>,
) -> Result<(), CandleLoadError> {
    let schema = batch.schema();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let layout = ColumnLayout::resolve(&names)?;

    let opens = float_column(batch.column(layout.open), "open")?;
    let highs = float_column(batch.column(layout.high), "high")?;
    let lows = float_column(batch.column(layout.low), "low")?;
    let closes = float_column(batch.column(layout.close), "close")?;
    let times = match layout.time {
        Some(idx) => Some(time_column_ms(batch.column(idx), names[idx], row_offset)?),
        None => None,
    };

    for row in 0..batch.num_rows() {
        let timestamp = match &times {
            Some(t) => {
                if t.is_null(row) {
                    return Err(CandleLoadError::InvalidValue {
                        row: row_offset + row,
                        column: "time",
                        value: "null".to_string(),
                    });
                }
                t.value(row)
            }
            None => (row_offset + row) as i64,
        };
        candles.push(Candle::new(
            timestamp,
            float_value(&opens, row, row_offset, "open")?,
            float_value(&highs, row, row_offset, "high")?,
            float_value(&lows, row, row_offset, "low")?,
            float_value(&closes, row, row_offset, "close")?,
        ));
    }
    Ok(())
}

fn float_column(column: &ArrayRef, name: &'static str) -> Result<Float64Array, CandleLoadError> {
    if !column.data_type().is_numeric() {
        return Err(CandleLoadError::UnsupportedColumnType {
            column: name.to_string(),
            data_type: column.data_type().to_string(),
        });
    }
    let casted = cast(column, &DataType::Float64)?;
    casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| CandleLoadError::UnsupportedColumnType {
            column: name.to_string(),
            data_type: column.data_type().to_string(),
        })
}

fn float_value(
    array: &Float64Array,
    row: usize,
    row_offset: usize,
    column: &'static str,
) -> Result<f64, CandleLoadError> {
    if array.is_null(row) {
        return Err(CandleLoadError::InvalidValue {
            row: row_offset + row,
            column,
            value: "null".to_string(),
        });
    }
    Ok(array.value(row))
}

/// 时间列统一为毫秒，换算溢出视为非法值
fn time_column_ms(
    column: &ArrayRef,
    name: &str,
    row_offset: usize,
) -> Result<Int64Array, CandleLoadError> {
    let scale: (i64, i64) = match column.data_type() {
        DataType::Timestamp(TimeUnit::Second, _) => (1, 1_000),
        DataType::Timestamp(TimeUnit::Millisecond, _) => (1, 1),
        DataType::Timestamp(TimeUnit::Microsecond, _) => (1_000, 1),
        DataType::Timestamp(TimeUnit::Nanosecond, _) => (1_000_000, 1),
        DataType::Date64 => (1, 1),
        DataType::Int64
        | DataType::Int32
        | DataType::Int16
        | DataType::UInt64
        | DataType::UInt32
        | DataType::UInt16 => (1, 1),
        other => {
            return Err(CandleLoadError::UnsupportedColumnType {
                column: name.to_string(),
                data_type: other.to_string(),
            })
        }
    };

    let casted = cast(column, &DataType::Int64)?;
    let raw = casted
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| CandleLoadError::UnsupportedColumnType {
            column: name.to_string(),
            data_type: column.data_type().to_string(),
        })?;

    let (divisor, multiplier) = scale;
    if divisor == 1 && multiplier == 1 {
        return Ok(raw.clone());
    }
    raw.iter()
        .enumerate()
        .map(|(row, v)| match v {
            None => Ok(None),
            Some(ts) => ts
                .checked_div_euclid(divisor)
                .and_then(|t| t.checked_mul(multiplier))
                .map(Some)
                .ok_or_else(|| CandleLoadError::InvalidValue {
                    row: row_offset + row,
                    column: "time",
                    value: ts.to_string(),
                }),
        })
        .collect()
}
