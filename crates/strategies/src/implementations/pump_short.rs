//! 急涨做空策略

use rust_scalp_domain::{Candle, Signal, TradeSide};

use crate::framework::signal_provider::IncrementalSignalProvider;

/// 最高价触及 open × (1 + pump) 时在阈值价做空
///
/// 信号基于盘中价格，开仓K线本身的高低点需要立即检查止盈止损
#[derive(Debug, Clone, Copy)]
pub struct PumpShortStrategy {
    pump_threshold: f64,
    take_profit: f64,
    stop_loss: f64,
}

impl PumpShortStrategy {
    pub fn new(pump_threshold: f64, take_profit: f64, stop_loss: f64) -> Self {
        Self {
            pump_threshold,
            take_profit,
            stop_loss,
        }
    }
}

impl IncrementalSignalProvider for PumpShortStrategy {
    fn name(&self) -> &'static str {
        "pump_short"
    }

    fn advance(&mut self, candle: &Candle) -> Option<Signal> {
        if candle.open <= 0.0 {
            return None;
        }
        let threshold = candle.open * (1.0 + self.pump_threshold);
        if candle.high < threshold {
            return None;
        }
        let signal = Signal::from_fractions(
            TradeSide::Short,
            threshold,
            self.take_profit,
            self.stop_loss,
            candle.timestamp,
        )
        .with_check_entry_candle(true)
        .with_pump_percent(Some(candle.change_fraction().unwrap_or(0.0)));
        Some(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_signal_at_threshold() {
        let mut strategy = PumpShortStrategy::new(0.02, 0.04, 0.02);
        assert!(strategy
            .advance(&Candle::new(0, 100.0, 101.9, 99.0, 101.0))
            .is_none());

        let signal = strategy
            .advance(&Candle::new(60_000, 100.0, 103.0, 99.0, 101.0))
            .unwrap();
        assert_eq!(signal.side, TradeSide::Short);
        assert_relative_eq!(signal.entry_price, 102.0, epsilon = 1e-9);
        assert_relative_eq!(signal.take_profit_price, 97.92, epsilon = 1e-9);
        assert_relative_eq!(signal.stop_loss_price, 104.04, epsilon = 1e-9);
        assert_eq!(signal.check_entry_candle, Some(true));
        assert_relative_eq!(signal.pump_percent.unwrap(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_open_is_ignored() {
        let mut strategy = PumpShortStrategy::new(0.02, 0.04, 0.02);
        assert!(strategy
            .advance(&Candle::new(0, 0.0, 1.0, 0.0, 0.5))
            .is_none());
    }
}
