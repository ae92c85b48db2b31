//! 开仓信号值对象

use serde::{Deserialize, Serialize};

use crate::entities::Candle;
use crate::enums::TradeSide;

/// 策略在空仓时给出的开仓决定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub side: TradeSide,
    pub entry_price: f64,
    pub take_profit_price: f64,
    pub stop_loss_price: f64,
    /// 信号K线时间戳 (毫秒)
    pub entry_timestamp: i64,
    /// 是否用信号K线自身的高低点检查即时止盈止损
    pub check_entry_candle: Option<bool>,
    /// 信号K线涨幅，仅用于诊断
    pub pump_percent: Option<f64>,
}

impl Signal {
    pub fn new(
        side: TradeSide,
        entry_price: f64,
        take_profit_price: f64,
        stop_loss_price: f64,
        entry_timestamp: i64,
    ) -> Self {
        Self {
            side,
            entry_price,
            take_profit_price,
            stop_loss_price,
            entry_timestamp,
            check_entry_candle: None,
            pump_percent: None,
        }
    }

    /// 按止盈/止损比例生成信号，价格方向随交易方向镜像
    ///
    /// - SHORT: tp = entry × (1 - tp), sl = entry × (1 + sl)
    /// - LONG:  tp = entry × (1 + tp), sl = entry × (1 - sl)
    pub fn from_fractions(
        side: TradeSide,
        entry_price: f64,
        take_profit: f64,
        stop_loss: f64,
        entry_timestamp: i64,
    ) -> Self {
        let (tp, sl) = match side {
            TradeSide::Short => (entry_price * (1.0 - take_profit), entry_price * (1.0 + stop_loss)),
            TradeSide::Long => (entry_price * (1.0 + take_profit), entry_price * (1.0 - stop_loss)),
        };
        Self::new(side, entry_price, tp, sl, entry_timestamp)
    }

    /// 以K线收盘价开仓
    pub fn at_close(side: TradeSide, candle: &Candle, take_profit: f64, stop_loss: f64) -> Self {
        Self::from_fractions(side, candle.close, take_profit, stop_loss, candle.timestamp)
            .with_pump_percent(candle.change_fraction())
    }

    pub fn with_check_entry_candle(mut self, check: bool) -> Self {
        self.check_entry_candle = Some(check);
        self
    }

    pub fn with_pump_percent(mut self, pump_percent: Option<f64>) -> Self {
        self.pump_percent = pump_percent;
        self
    }

    /// 价格是否都是有限值
    pub fn is_valid(&self) -> bool {
        self.entry_price.is_finite()
            && self.take_profit_price.is_finite()
            && self.stop_loss_price.is_finite()
            && self.entry_price > 0.0
    }
}
