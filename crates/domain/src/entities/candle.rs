//! K线实体
//!
//! 单根K线只保存 OHLC 与时间戳，标的标识放在 [`CandleTable`] 上

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// K线数据校验错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandleError {
    #[error("K线价格非法: index={index}, {reason}")]
    InvalidPrice { index: usize, reason: String },

    #[error("K线时间戳未严格递增: index={index}, prev={prev}, current={current}")]
    NonIncreasingTimestamp { index: usize, prev: i64, current: i64 },
}

/// 单根K线
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// K线开始时间戳 (毫秒)
    pub timestamp: i64,
    /// 开盘价
    pub open: f64,
    /// 最高价
    pub high: f64,
    /// 最低价
    pub low: f64,
    /// 收盘价
    pub close: f64,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// 获取实体大小
    pub fn body_size(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// 获取总范围 (高-低)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// 涨跌幅（小数），开盘价为0时返回 None
    pub fn change_fraction(&self) -> Option<f64> {
        if self.open == 0.0 {
            return None;
        }
        Some((self.close - self.open) / self.open)
    }

    /// 实体占比，振幅为0时返回 None
    pub fn body_ratio(&self) -> Option<f64> {
        let range = self.range();
        if range > 0.0 {
            Some(self.body_size() / range)
        } else {
            None
        }
    }

    fn validate(&self, index: usize) -> Result<(), CandleError> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(CandleError::InvalidPrice {
                index,
                reason: "存在 NaN/Inf".to_string(),
            });
        }
        if self.high < self.low {
            return Err(CandleError::InvalidPrice {
                index,
                reason: format!("high({}) < low({})", self.high, self.low),
            });
        }
        Ok(())
    }
}

/// 单个标的的完整K线序列（按时间严格递增）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleTable {
    instrument_id: String,
    candles: Vec<Candle>,
}

impl CandleTable {
    /// 创建K线表并校验价格与时间顺序
    pub fn new(instrument_id: impl Into<String>, candles: Vec<Candle>) -> Result<Self, CandleError> {
        for (index, candle) in candles.iter().enumerate() {
            candle.validate(index)?;
            if index > 0 {
                let prev = candles[index - 1].timestamp;
                if candle.timestamp <= prev {
                    return Err(CandleError::NonIncreasingTimestamp {
                        index,
                        prev,
                        current: candle.timestamp,
                    });
                }
            }
        }
        Ok(Self {
            instrument_id: instrument_id.into(),
            candles,
        })
    }

    /// 空表
    pub fn empty(instrument_id: impl Into<String>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            candles: Vec::new(),
        }
    }

    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// 收盘价序列
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }
}
