//! 向量化急涨策略
//!
//! 回测前一次性计算整张表的 `entry_signal` 列：
//! 趋势（EMA 链，预热期未定义视为 false）+ 急涨/急跌 + 光头光脚

use rust_scalp_domain::{Candle, CandleTable, Signal, TradeSide};
use rust_scalp_indicators::{
    ema_series, EmaChainState, MarubozuIndicator, PumpIndicator, EMA_CHAIN_PERIODS,
};

use crate::config::{EntryCondition, StrategyConfig};
use crate::framework::signal_provider::{PreparedSignals, VectorizedSignalProvider};

#[derive(Debug, Clone, Copy)]
pub struct VectorizedPumpStrategy {
    side: TradeSide,
    trend_key: Option<&'static str>,
    condition: EntryCondition,
    pump: PumpIndicator,
    marubozu: MarubozuIndicator,
    take_profit: f64,
    stop_loss: f64,
}

impl VectorizedPumpStrategy {
    pub fn from_config(config: &StrategyConfig) -> Self {
        Self {
            side: config.side,
            trend_key: config.resolved_trend(),
            condition: config.entry_condition,
            pump: PumpIndicator::new(config.pump_threshold, config.dump_threshold),
            marubozu: MarubozuIndicator::new(config.marubozu_threshold),
            take_profit: config.take_profit,
            stop_loss: config.stop_loss,
        }
    }

    /// 每根K线的趋势是否成立，不过滤时全部为 true
    fn trend_column(&self, table: &CandleTable) -> Vec<bool> {
        let Some(key) = self.trend_key else {
            return vec![true; table.len()];
        };
        let closes = table.closes();
        // min_periods = period
        let series: Vec<Vec<Option<f64>>> = EMA_CHAIN_PERIODS
            .iter()
            .map(|p| ema_series(&closes, *p, *p))
            .collect();

        (0..table.len())
            .map(|i| {
                let mut emas = [None; 10];
                for (slot, column) in emas.iter_mut().zip(series.iter()) {
                    *slot = column[i];
                }
                EmaChainState::evaluate(&emas).get(key).unwrap_or(false)
            })
            .collect()
    }

    fn candle_matches(&self, candle: &Candle) -> bool {
        let pump = self.pump.evaluate(candle);
        let moved = match self.condition {
            EntryCondition::Pump => pump.is_pump,
            EntryCondition::Dump => pump.is_dump,
        };
        moved && self.marubozu.evaluate(candle).is_marubozu
    }
}

impl VectorizedSignalProvider for VectorizedPumpStrategy {
    fn name(&self) -> &'static str {
        "vectorized"
    }

    fn prepare(&self, table: &CandleTable) -> PreparedSignals {
        let trend = self.trend_column(table);
        PreparedSignals::new(
            table
                .candles()
                .iter()
                .zip(trend)
                .map(|(candle, trend_ok)| trend_ok && self.candle_matches(candle))
                .collect(),
        )
    }

    fn signal_at(&self, candle: &Candle) -> Signal {
        Signal::at_close(self.side, candle, self.take_profit, self.stop_loss)
            .with_check_entry_candle(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrendFilter;
    use approx::assert_relative_eq;

    fn candles() -> Vec<Candle> {
        vec![
            Candle::new(0, 100.0, 100.5, 99.5, 100.1),
            // 急涨光头
            Candle::new(60_000, 100.0, 103.0, 100.0, 103.0),
            // 急跌光脚
            Candle::new(120_000, 103.0, 103.0, 100.0, 100.0),
            // 涨幅够但上影线长
            Candle::new(180_000, 100.0, 110.0, 100.0, 103.0),
        ]
    }

    #[test]
    fn test_prepare_without_trend() {
        let table = CandleTable::new("TEST_1m", candles()).unwrap();
        let config = StrategyConfig {
            trend: TrendFilter::Off,
            ..StrategyConfig::default()
        };
        let prepared = VectorizedPumpStrategy::from_config(&config).prepare(&table);
        assert_eq!(prepared.len(), 4);
        assert_eq!(prepared.count(), 1);
        assert!(prepared.is_entry(1));

        let dump = StrategyConfig {
            entry_condition: EntryCondition::Dump,
            ..config
        };
        let prepared = VectorizedPumpStrategy::from_config(&dump).prepare(&table);
        assert!(prepared.is_entry(2));
        assert_eq!(prepared.count(), 1);
    }

    #[test]
    fn test_trend_undefined_during_warmup() {
        let table = CandleTable::new("TEST_1m", candles()).unwrap();
        // 默认 SHORT => all_bear，数据太短 EMA 未定义
        let prepared =
            VectorizedPumpStrategy::from_config(&StrategyConfig::default()).prepare(&table);
        assert_eq!(prepared.count(), 0);
    }

    #[test]
    fn test_signal_at_close() {
        let strategy = VectorizedPumpStrategy::from_config(&StrategyConfig::default());
        let signal = strategy.signal_at(&candles()[1]);
        assert_eq!(signal.side, TradeSide::Short);
        assert_relative_eq!(signal.entry_price, 103.0);
        assert_relative_eq!(signal.stop_loss_price, 103.0 * 1.02, epsilon = 1e-9);
        assert_eq!(signal.check_entry_candle, Some(false));
    }
}
