use serde::{Deserialize, Serialize};

use rust_scalp_domain::Candle;

use crate::Indicator;

/// 急涨 / 急跌判定结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PumpOutput {
    /// (close - open) / open，开盘价为0时为 None
    pub change: Option<f64>,
    /// 涨幅超过急涨阈值
    pub is_pump: bool,
    /// 跌幅超过急跌阈值
    pub is_dump: bool,
}

/// 单根K线急涨急跌指标（阈值为小数，如 0.02）
#[derive(Debug, Clone, Copy)]
pub struct PumpIndicator {
    pump_threshold: f64,
    dump_threshold: f64,
}

impl Default for PumpIndicator {
    fn default() -> Self {
        Self::new(0.02, 0.02)
    }
}

impl PumpIndicator {
    pub fn new(pump_threshold: f64, dump_threshold: f64) -> Self {
        Self {
            pump_threshold,
            dump_threshold,
        }
    }

    pub fn evaluate(&self, candle: &Candle) -> PumpOutput {
        match candle.change_fraction() {
            Some(change) => PumpOutput {
                change: Some(change),
                is_pump: change > self.pump_threshold,
                is_dump: change < -self.dump_threshold,
            },
            None => PumpOutput::default(),
        }
    }
}

impl Indicator for PumpIndicator {
    type Input = Candle;
    type Output = PumpOutput;

    fn update(&mut self, candle: Candle) -> PumpOutput {
        self.evaluate(&candle)
    }

    fn reset(&mut self) {}
}
