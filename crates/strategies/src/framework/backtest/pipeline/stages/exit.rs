//! ExitStage - 出场阶段

use crate::error::StrategyError;
use crate::framework::backtest::pipeline::{BacktestContext, BacktestStage, StageResult};

/// 出场阶段
///
/// 先以此前的最优价检查移动止损，再用本K线更新最优价，最后检查固定止损止盈
#[derive(Debug, Default)]
pub struct ExitStage;

impl ExitStage {
    pub fn new() -> Self {
        Self
    }
}

impl BacktestStage for ExitStage {
    fn name(&self) -> &'static str {
        "ExitStage"
    }

    fn process(&mut self, ctx: &mut BacktestContext) -> Result<StageResult, StrategyError> {
        let candle = ctx.candle;
        let priority = ctx.config.exit_priority;
        let Some(position) = ctx.position.as_mut() else {
            return Ok(StageResult::Continue);
        };

        let exit = match position.check_trailing_exit(&candle) {
            Some(hit) => Some(hit),
            None => {
                position.update_best(&candle);
                position.check_fixed_exit(&candle, priority)
            }
        };

        match exit {
            Some((kind, price)) => {
                ctx.close_position(kind, price);
                Ok(StageResult::Exit { kind, price })
            }
            None => Ok(StageResult::Continue),
        }
    }
}
