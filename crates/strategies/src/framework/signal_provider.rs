//! 信号提供者抽象
//!
//! 两种能力在配置阶段选定：
//! - 增量：逐根K线调用，可持有指标累加状态
//! - 向量化：回测开始前一次性算出整张表的布尔信号列
//!
//! 模拟器只依赖"每个空仓区间至多一个信号"这一约定，不依赖具体策略类型

use rust_scalp_domain::{Candle, CandleTable, Signal};

use crate::error::StrategyError;

/// 增量信号提供者
pub trait IncrementalSignalProvider: Send {
    fn name(&self) -> &'static str;

    /// 空仓时按K线顺序调用，返回开仓信号
    fn advance(&mut self, candle: &Candle) -> Option<Signal>;

    /// 持仓期间调用，只推进内部指标状态，不产生信号
    ///
    /// 指标在持仓期间照常更新，平仓后第一根K线看到的是连续的指标值，
    /// 而不是停在开仓时的旧值。
    fn observe(&mut self, _candle: &Candle) {}
}

/// 向量化信号提供者
pub trait VectorizedSignalProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// 计算整张表的入场信号列
    fn prepare(&self, table: &CandleTable) -> PreparedSignals;

    /// 由信号K线生成完整的开仓信号
    fn signal_at(&self, candle: &Candle) -> Signal;
}

/// 预先计算的 `entry_signal` 列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedSignals {
    entry_signal: Vec<bool>,
}

impl PreparedSignals {
    pub fn new(entry_signal: Vec<bool>) -> Self {
        Self { entry_signal }
    }

    pub fn is_entry(&self, index: usize) -> bool {
        self.entry_signal.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entry_signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_signal.is_empty()
    }

    /// 信号总数（含持仓期间会被忽略的）
    pub fn count(&self) -> usize {
        self.entry_signal.iter().filter(|s| **s).count()
    }

    /// 信号列必须与K线表等长
    pub fn ensure_len(&self, expected: usize) -> Result<(), StrategyError> {
        if self.entry_signal.len() != expected {
            return Err(StrategyError::SignalColumnLength {
                expected,
                actual: self.entry_signal.len(),
            });
        }
        Ok(())
    }
}

/// 按能力区分的信号源
pub enum SignalSource {
    Incremental(Box<dyn IncrementalSignalProvider>),
    Vectorized(Box<dyn VectorizedSignalProvider>),
}

impl SignalSource {
    pub fn incremental<P: IncrementalSignalProvider + 'static>(provider: P) -> Self {
        SignalSource::Incremental(Box::new(provider))
    }

    pub fn vectorized<P: VectorizedSignalProvider + 'static>(provider: P) -> Self {
        SignalSource::Vectorized(Box::new(provider))
    }

    pub fn name(&self) -> &'static str {
        match self {
            SignalSource::Incremental(p) => p.name(),
            SignalSource::Vectorized(p) => p.name(),
        }
    }

    pub fn is_vectorized(&self) -> bool {
        matches!(self, SignalSource::Vectorized(_))
    }
}

impl std::fmt::Debug for SignalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalSource::Incremental(p) => write!(f, "Incremental({})", p.name()),
            SignalSource::Vectorized(p) => write!(f, "Vectorized({})", p.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepared_signals() {
        let prepared = PreparedSignals::new(vec![false, true, true]);
        assert!(prepared.is_entry(1));
        assert!(!prepared.is_entry(7));
        assert_eq!(prepared.count(), 2);
        assert!(prepared.ensure_len(3).is_ok());
        assert_eq!(
            prepared.ensure_len(4),
            Err(StrategyError::SignalColumnLength {
                expected: 4,
                actual: 3
            })
        );
    }
}
