//! 策略配置
//!
//! 一组扁平的命名参数，串行与并行模式下完全相同地使用，每个 worker 持有一份拷贝

use serde::{Deserialize, Serialize};

use rust_scalp_domain::{ExitPriority, TradeSide};

use crate::error::StrategyError;
use crate::framework::backtest::SimulationConfig;
use crate::framework::signal_provider::SignalSource;
use crate::implementations::{ema_pump_provider, PumpShortStrategy, VectorizedPumpStrategy};

/// 参考策略类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// 预先计算整张表的信号列
    #[default]
    Vectorized,
    /// 盘中触及急涨阈值即做空
    PumpShort,
    /// EMA 趋势 + 急涨 + 光头光脚，逐根K线组合判定
    EmaPump,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Vectorized => "vectorized",
            StrategyKind::PumpShort => "pump_short",
            StrategyKind::EmaPump => "ema_pump",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "vectorized" => Ok(StrategyKind::Vectorized),
            "pump_short" => Ok(StrategyKind::PumpShort),
            "ema_pump" => Ok(StrategyKind::EmaPump),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

/// 入场K线条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryCondition {
    /// 急涨
    #[default]
    Pump,
    /// 急跌
    Dump,
}

impl EntryCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryCondition::Pump => "pump",
            EntryCondition::Dump => "dump",
        }
    }

    /// 对应的条件键
    pub fn key(&self) -> &'static str {
        match self {
            EntryCondition::Pump => "is_pump",
            EntryCondition::Dump => "is_dump",
        }
    }
}

impl std::str::FromStr for EntryCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pump" => Ok(EntryCondition::Pump),
            "dump" => Ok(EntryCondition::Dump),
            _ => Err(format!("Unknown entry condition: {}", s)),
        }
    }
}

/// EMA 链趋势过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrendFilter {
    /// 使用策略自身的默认趋势
    #[default]
    StrategyDefault,
    /// 不做趋势过滤
    Off,
    AllBull,
    AllBear,
    SmallBull,
    SmallBear,
    BigBull,
    BigBear,
    /// 大链多头 + 小链空头
    CorrectionLong,
    /// 大链空头 + 小链多头
    ReactionShort,
}

impl TrendFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendFilter::StrategyDefault => "none",
            TrendFilter::Off => "off",
            other => other.key().unwrap_or("none"),
        }
    }

    /// 条件字典中的键，StrategyDefault / Off 没有对应键
    pub fn key(&self) -> Option<&'static str> {
        match self {
            TrendFilter::StrategyDefault | TrendFilter::Off => None,
            TrendFilter::AllBull => Some("all_bull"),
            TrendFilter::AllBear => Some("all_bear"),
            TrendFilter::SmallBull => Some("small_bull"),
            TrendFilter::SmallBear => Some("small_bear"),
            TrendFilter::BigBull => Some("big_bull"),
            TrendFilter::BigBear => Some("big_bear"),
            TrendFilter::CorrectionLong => Some("correction_long"),
            TrendFilter::ReactionShort => Some("reaction_short"),
        }
    }
}

impl std::fmt::Display for TrendFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TrendFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "" => Ok(TrendFilter::StrategyDefault),
            "off" => Ok(TrendFilter::Off),
            "all_bull" => Ok(TrendFilter::AllBull),
            "all_bear" => Ok(TrendFilter::AllBear),
            "small_bull" => Ok(TrendFilter::SmallBull),
            "small_bear" => Ok(TrendFilter::SmallBear),
            "big_bull" => Ok(TrendFilter::BigBull),
            "big_bear" => Ok(TrendFilter::BigBear),
            "correction_long" | "big_bull_small_bear" => Ok(TrendFilter::CorrectionLong),
            "reaction_short" | "big_bear_small_bull" => Ok(TrendFilter::ReactionShort),
            _ => Err(format!("Unknown trend filter: {}", s)),
        }
    }
}

/// 策略参数，比例均为小数（0.04 = 4%）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub strategy: StrategyKind,
    pub side: TradeSide,
    pub take_profit: f64,
    pub stop_loss: f64,
    /// 0 为关闭移动止损
    pub trailing_stop: f64,
    pub entry_condition: EntryCondition,
    pub pump_threshold: f64,
    pub dump_threshold: f64,
    /// 实体 / 振幅，0 到 1
    pub marubozu_threshold: f64,
    pub trend: TrendFilter,
    /// 每笔名义仓位
    pub bet_size: f64,
    pub exit_priority: ExitPriority,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Vectorized,
            side: TradeSide::Short,
            take_profit: 0.04,
            stop_loss: 0.02,
            trailing_stop: 0.0,
            entry_condition: EntryCondition::Pump,
            pump_threshold: 0.02,
            dump_threshold: 0.02,
            marubozu_threshold: 0.80,
            trend: TrendFilter::StrategyDefault,
            bet_size: 7.0,
            exit_priority: ExitPriority::StopFirst,
        }
    }
}

impl StrategyConfig {
    /// 参数校验，任何一项非法都在回测开始前报错
    pub fn validate(&self) -> Result<(), StrategyError> {
        let fractions = [
            ("take_profit", self.take_profit),
            ("stop_loss", self.stop_loss),
            ("trailing_stop", self.trailing_stop),
            ("pump_threshold", self.pump_threshold),
            ("dump_threshold", self.dump_threshold),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || value < 0.0 {
                return Err(StrategyError::InvalidConfig(format!(
                    "{} 必须为非负有限数, got {}",
                    name, value
                )));
            }
        }
        if self.stop_loss >= 1.0 && self.side == TradeSide::Long {
            return Err(StrategyError::InvalidConfig(format!(
                "做多止损比例必须小于 1, got {}",
                self.stop_loss
            )));
        }
        if !(0.0..=1.0).contains(&self.marubozu_threshold) {
            return Err(StrategyError::InvalidConfig(format!(
                "marubozu_threshold 必须在 0 到 1 之间, got {}",
                self.marubozu_threshold
            )));
        }
        if !self.bet_size.is_finite() || self.bet_size <= 0.0 {
            return Err(StrategyError::InvalidConfig(format!(
                "bet_size 必须大于 0, got {}",
                self.bet_size
            )));
        }
        Ok(())
    }

    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig::default()
            .with_position_size(self.bet_size)
            .with_trailing_stop(self.trailing_stop)
            .with_exit_priority(self.exit_priority)
    }

    /// 实际生效的趋势键
    ///
    /// - vectorized 默认按方向：SHORT 用 all_bear，LONG 用 all_bull
    /// - ema_pump 默认 all_bull
    /// - pump_short 不使用趋势
    pub fn resolved_trend(&self) -> Option<&'static str> {
        match (self.trend, self.strategy) {
            (TrendFilter::Off, _) | (_, StrategyKind::PumpShort) => None,
            (TrendFilter::StrategyDefault, StrategyKind::Vectorized) => match self.side {
                TradeSide::Short => Some("all_bear"),
                TradeSide::Long => Some("all_bull"),
            },
            (TrendFilter::StrategyDefault, StrategyKind::EmaPump) => Some("all_bull"),
            (explicit, _) => explicit.key(),
        }
    }

    /// 为单个标的构建新的信号源，增量策略的指标状态不在标的间共享
    pub fn build_source(&self) -> Result<SignalSource, StrategyError> {
        let source = match self.strategy {
            StrategyKind::Vectorized => {
                SignalSource::vectorized(VectorizedPumpStrategy::from_config(self))
            }
            StrategyKind::PumpShort => SignalSource::incremental(PumpShortStrategy::new(
                self.pump_threshold,
                self.take_profit,
                self.stop_loss,
            )),
            StrategyKind::EmaPump => SignalSource::incremental(ema_pump_provider(self)?),
        };
        Ok(source)
    }

    /// 运行横幅中的参数摘要
    pub fn describe(&self) -> String {
        let side = match self.strategy {
            StrategyKind::PumpShort => TradeSide::Short,
            _ => self.side,
        };
        let tsl = if self.trailing_stop > 0.0 {
            format!("{:.2}%", self.trailing_stop * 100.0)
        } else {
            "off".to_string()
        };
        format!(
            "strategy={} side={} cond={} tp={:.2}% sl={:.2}% tsl={} pump={:.2}% dump={:.2}% marubozu={:.2} trend={} bet={} priority={}",
            self.strategy,
            side,
            self.entry_condition.as_str(),
            self.take_profit * 100.0,
            self.stop_loss * 100.0,
            tsl,
            self.pump_threshold * 100.0,
            self.dump_threshold * 100.0,
            self.marubozu_threshold,
            self.resolved_trend().unwrap_or("off"),
            self.bet_size,
            self.exit_priority.as_str(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enums() {
        assert_eq!("pump-short".parse::<StrategyKind>(), Ok(StrategyKind::PumpShort));
        assert_eq!("EMA_PUMP".parse::<StrategyKind>(), Ok(StrategyKind::EmaPump));
        assert!("grid".parse::<StrategyKind>().is_err());
        assert_eq!("dump".parse::<EntryCondition>(), Ok(EntryCondition::Dump));
        assert_eq!(
            "big_bull_small_bear".parse::<TrendFilter>(),
            Ok(TrendFilter::CorrectionLong)
        );
        assert_eq!("none".parse::<TrendFilter>(), Ok(TrendFilter::StrategyDefault));
    }

    #[test]
    fn test_resolved_trend() {
        let mut config = StrategyConfig::default();
        assert_eq!(config.resolved_trend(), Some("all_bear"));

        config.side = TradeSide::Long;
        assert_eq!(config.resolved_trend(), Some("all_bull"));

        config.trend = TrendFilter::Off;
        assert_eq!(config.resolved_trend(), None);

        config.trend = TrendFilter::ReactionShort;
        assert_eq!(config.resolved_trend(), Some("reaction_short"));

        config.strategy = StrategyKind::PumpShort;
        assert_eq!(config.resolved_trend(), None);

        let ema = StrategyConfig {
            strategy: StrategyKind::EmaPump,
            ..StrategyConfig::default()
        };
        assert_eq!(ema.resolved_trend(), Some("all_bull"));
    }

    #[test]
    fn test_validate() {
        assert!(StrategyConfig::default().validate().is_ok());

        let bad = [
            StrategyConfig {
                take_profit: -0.01,
                ..StrategyConfig::default()
            },
            StrategyConfig {
                trailing_stop: f64::NAN,
                ..StrategyConfig::default()
            },
            StrategyConfig {
                marubozu_threshold: 1.5,
                ..StrategyConfig::default()
            },
            StrategyConfig {
                bet_size: 0.0,
                ..StrategyConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(StrategyError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_simulation_config_and_sources() {
        let config = StrategyConfig {
            trailing_stop: 0.01,
            bet_size: 10.0,
            ..StrategyConfig::default()
        };
        let sim = config.simulation_config();
        assert_eq!(sim.trailing_stop, Some(0.01));
        assert_eq!(sim.position_size, 10.0);
        assert!(!sim.check_entry_candle);

        assert!(config.build_source().unwrap().is_vectorized());
        for strategy in [StrategyKind::PumpShort, StrategyKind::EmaPump] {
            let source = StrategyConfig {
                strategy,
                ..config
            }
            .build_source()
            .unwrap();
            assert!(!source.is_vectorized());
        }
    }

    #[test]
    fn test_serde_round_trip_names() {
        let json = serde_json::to_value(StrategyConfig::default()).unwrap();
        assert_eq!(json["strategy"], "vectorized");
        assert_eq!(json["side"], "SHORT");
        assert_eq!(json["trend"], "strategy_default");
    }
}
