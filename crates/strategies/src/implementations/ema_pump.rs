//! EMA 趋势 + 急涨光头光脚组合策略
//!
//! 两个条件集合各自维护指标状态，键互不重叠；决策器只读取合并后的条件字典

use rust_scalp_domain::{Candle, Signal, TradeSide};
use rust_scalp_indicators::{
    EmaChainIndicator, EmaChainState, Indicator, MarubozuIndicator, PumpIndicator,
};

use crate::config::StrategyConfig;
use crate::error::StrategyError;
use crate::framework::conditions::{ComposedSignalProvider, ConditionMap, ConditionSet, Decision};

/// EMA 链趋势条件
#[derive(Debug, Clone, Default)]
pub struct EmaChainConditions {
    chain: EmaChainIndicator,
}

impl EmaChainConditions {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConditionSet for EmaChainConditions {
    fn name(&self) -> &'static str {
        "ema_chain"
    }

    fn keys(&self) -> &'static [&'static str] {
        &EmaChainState::KEYS
    }

    fn on_candle(&mut self, candle: &Candle) -> ConditionMap {
        let state = self.chain.update(candle.close);
        let mut map = ConditionMap::new();
        for (key, value) in state.entries() {
            map.set_flag(key, value);
        }
        map
    }
}

/// 急涨急跌 + 光头光脚条件
#[derive(Debug, Clone, Copy)]
pub struct MarubozuConditions {
    pump: PumpIndicator,
    marubozu: MarubozuIndicator,
}

impl MarubozuConditions {
    pub const KEYS: [&'static str; 4] = ["is_pump", "is_dump", "is_marubozu", "pump_percentage"];

    pub fn new(pump_threshold: f64, dump_threshold: f64, marubozu_threshold: f64) -> Self {
        Self {
            pump: PumpIndicator::new(pump_threshold, dump_threshold),
            marubozu: MarubozuIndicator::new(marubozu_threshold),
        }
    }
}

impl ConditionSet for MarubozuConditions {
    fn name(&self) -> &'static str {
        "marubozu"
    }

    fn keys(&self) -> &'static [&'static str] {
        &Self::KEYS
    }

    fn on_candle(&mut self, candle: &Candle) -> ConditionMap {
        let pump = self.pump.evaluate(candle);
        let mut map = ConditionMap::new();
        // 开盘价为0时全部为 false
        let is_marubozu = pump.change.is_some() && self.marubozu.evaluate(candle).is_marubozu;
        map.set_flag("is_pump", pump.is_pump);
        map.set_flag("is_dump", pump.is_dump);
        map.set_flag("is_marubozu", is_marubozu);
        map.set_number("pump_percentage", pump.change.unwrap_or(0.0));
        map
    }
}

/// 趋势键 + 入场条件键 + 光头光脚同时成立时按收盘价开仓
#[derive(Debug, Clone, Copy)]
pub struct EmaPumpDecision {
    pub side: TradeSide,
    /// None 表示不做趋势过滤
    pub trend_key: Option<&'static str>,
    pub entry_key: &'static str,
    pub take_profit: f64,
    pub stop_loss: f64,
}

impl Decision for EmaPumpDecision {
    fn decide(&self, conditions: &ConditionMap, candle: &Candle) -> Option<Signal> {
        let trend_ok = self.trend_key.map_or(true, |key| conditions.flag(key));
        if !(trend_ok && conditions.flag(self.entry_key) && conditions.flag("is_marubozu")) {
            return None;
        }
        Some(
            Signal::at_close(self.side, candle, self.take_profit, self.stop_loss)
                .with_pump_percent(conditions.number("pump_percentage")),
        )
    }
}

/// 由配置组装 ema_pump 信号源
pub fn ema_pump_provider(config: &StrategyConfig) -> Result<ComposedSignalProvider, StrategyError> {
    let decision = EmaPumpDecision {
        side: config.side,
        trend_key: config.resolved_trend(),
        entry_key: config.entry_condition.key(),
        take_profit: config.take_profit,
        stop_loss: config.stop_loss,
    };
    ComposedSignalProvider::new(
        "ema_pump",
        vec![
            Box::new(EmaChainConditions::new()),
            Box::new(MarubozuConditions::new(
                config.pump_threshold,
                config.dump_threshold,
                config.marubozu_threshold,
            )),
        ],
        Box::new(decision),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StrategyKind, TrendFilter};
    use crate::framework::signal_provider::IncrementalSignalProvider;
    use approx::assert_relative_eq;

    fn pump_candle(ts: i64) -> Candle {
        // 涨 3%，实体占振幅 100%
        Candle::new(ts, 100.0, 103.0, 100.0, 103.0)
    }

    #[test]
    fn test_marubozu_conditions() {
        let mut set = MarubozuConditions::new(0.02, 0.02, 0.8);
        let map = set.on_candle(&pump_candle(0));
        assert!(map.flag("is_pump"));
        assert!(!map.flag("is_dump"));
        assert!(map.flag("is_marubozu"));
        assert_relative_eq!(map.number("pump_percentage").unwrap(), 0.03, epsilon = 1e-12);

        // 长上影线
        let map = set.on_candle(&Candle::new(1, 100.0, 110.0, 100.0, 103.0));
        assert!(map.flag("is_pump"));
        assert!(!map.flag("is_marubozu"));

        let map = set.on_candle(&Candle::new(2, 0.0, 1.0, 0.0, 1.0));
        assert!(!map.flag("is_pump") && !map.flag("is_marubozu"));
    }

    #[test]
    fn test_trend_filter_off_signals_on_pump_marubozu() {
        let config = StrategyConfig {
            strategy: StrategyKind::EmaPump,
            trend: TrendFilter::Off,
            ..StrategyConfig::default()
        };
        let mut provider = ema_pump_provider(&config).unwrap();
        assert!(provider
            .advance(&Candle::new(0, 100.0, 100.5, 99.5, 100.2))
            .is_none());

        let signal = provider.advance(&pump_candle(60_000)).unwrap();
        assert_eq!(signal.side, TradeSide::Short);
        assert_relative_eq!(signal.entry_price, 103.0);
        assert_relative_eq!(signal.take_profit_price, 103.0 * 0.96, epsilon = 1e-9);
        assert_eq!(signal.check_entry_candle, None);
    }

    #[test]
    fn test_default_trend_requires_all_bull() {
        let config = StrategyConfig {
            strategy: StrategyKind::EmaPump,
            side: TradeSide::Long,
            ..StrategyConfig::default()
        };
        let mut provider = ema_pump_provider(&config).unwrap();
        // 第一根K线所有 EMA 相等，没有趋势
        assert!(provider.advance(&pump_candle(0)).is_none());
        assert!(!provider.conditions().flag("all_bull"));

        // 稳步上涨后小链与大链都为多头
        for i in 1..400 {
            let base = 100.0 + i as f64 * 0.1;
            provider.observe(&Candle::new(i * 60_000, base, base + 0.05, base - 0.05, base + 0.04));
        }
        let close = 100.0 + 400.0 * 0.1;
        let candle = Candle::new(400 * 60_000, close - 3.0, close, close - 3.0, close);
        let signal = provider.advance(&candle).unwrap();
        assert!(provider.conditions().flag("all_bull"));
        assert_eq!(signal.side, TradeSide::Long);
        assert_relative_eq!(signal.stop_loss_price, close * 0.98, epsilon = 1e-9);
    }

    #[test]
    fn test_condition_sets_are_disjoint() {
        let ema = EmaChainConditions::new();
        for key in MarubozuConditions::KEYS {
            assert!(!ema.keys().contains(&key));
        }
    }
}
