//! Pipeline上下文定义

use rust_scalp_domain::{Candle, ExitKind, Trade};

use crate::framework::backtest::position::Position;
use crate::framework::backtest::types::SimulationConfig;

/// 回测Pipeline上下文
///
/// 统一状态容器，各Stage通过修改Context实现状态传递
#[derive(Debug)]
pub struct BacktestContext {
    /// 当前K线
    pub candle: Candle,
    /// 当前K线索引
    pub candle_index: usize,
    /// 标的标识
    pub inst_id: String,
    pub config: SimulationConfig,

    /// 当前持仓，空仓为 None
    pub position: Option<Position>,
    /// 已平仓交易，按平仓顺序
    pub trades: Vec<Trade>,
}

impl BacktestContext {
    pub fn new(candle: Candle, inst_id: impl Into<String>, config: SimulationConfig) -> Self {
        Self {
            candle,
            candle_index: 0,
            inst_id: inst_id.into(),
            config,
            position: None,
            trades: Vec::new(),
        }
    }

    /// 切换到下一根K线，持仓与成交保留
    pub fn reset_for_next_candle(&mut self, candle: Candle, candle_index: usize) {
        self.candle = candle;
        self.candle_index = candle_index;
    }

    #[inline]
    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    /// 平掉当前持仓并记录交易，平仓时间为当前K线
    pub fn close_position(&mut self, kind: ExitKind, price: f64) {
        if let Some(position) = self.position.take() {
            let trade = position.close(
                &self.inst_id,
                self.candle.timestamp,
                kind,
                price,
                self.config.position_size,
            );
            self.trades.push(trade);
        }
    }
}
