//! Pipeline执行器

use rust_scalp_domain::{CandleTable, Trade};
use tracing::debug;

use super::context::BacktestContext;
use super::stage::{BacktestStage, StageResult};
use crate::error::StrategyError;
use crate::framework::backtest::types::SimulationConfig;

/// Pipeline执行器
///
/// 管理Stage链的执行
pub struct PipelineRunner {
    stages: Vec<Box<dyn BacktestStage>>,
}

impl PipelineRunner {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// 添加Stage
    pub fn add_stage<S: BacktestStage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// 执行Pipeline处理单根K线
    pub fn process_candle(
        &mut self,
        ctx: &mut BacktestContext,
    ) -> Result<StageResult, StrategyError> {
        for stage in &mut self.stages {
            let result = stage.process(ctx).map_err(|e| {
                debug!(
                    "阶段执行失败: stage={}, inst_id={}, index={}, err={}",
                    stage.name(),
                    ctx.inst_id,
                    ctx.candle_index,
                    e
                );
                e
            })?;
            match result {
                StageResult::Continue => continue,
                StageResult::Skip | StageResult::Exit { .. } => return Ok(result),
            }
        }
        Ok(StageResult::Continue)
    }

    /// 执行完整回测，返回按平仓顺序排列的交易
    ///
    /// 数据结束时仍未平仓的持仓不产生交易
    pub fn run(
        &mut self,
        table: &CandleTable,
        config: SimulationConfig,
    ) -> Result<Vec<Trade>, StrategyError> {
        let Some(first) = table.candles().first() else {
            return Ok(Vec::new());
        };

        for stage in &mut self.stages {
            stage.prepare(table)?;
        }

        let mut ctx = BacktestContext::new(*first, table.instrument_id(), config);
        for (i, candle) in table.candles().iter().enumerate() {
            ctx.reset_for_next_candle(*candle, i);
            if let StageResult::Exit { kind, price } = self.process_candle(&mut ctx)? {
                debug!(
                    "平仓: inst_id={}, ts={}, type={}, price={}",
                    ctx.inst_id, candle.timestamp, kind, price
                );
            }
        }

        if let Some(position) = &ctx.position {
            debug!(
                "数据结束时仍有持仓，丢弃: inst_id={}, entry_ts={}",
                ctx.inst_id, position.entry_timestamp
            );
        }
        Ok(ctx.trades)
    }
}

impl Default for PipelineRunner {
    fn default() -> Self {
        Self::new()
    }
}
