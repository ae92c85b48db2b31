//! 单标的回测入口

use rust_scalp_domain::{CandleTable, Trade};

use super::pipeline::stages::{ExitStage, SignalStage};
use super::pipeline::PipelineRunner;
use super::types::SimulationConfig;
use crate::error::StrategyError;
use crate::framework::signal_provider::SignalSource;

/// 对单个标的的K线表运行状态机，返回按时间排列且互不重叠的交易
///
/// 空表直接返回空列表；信号非法或信号列长度不符时返回错误，由调用方隔离
pub fn simulate(
    table: &CandleTable,
    source: SignalSource,
    config: &SimulationConfig,
) -> Result<Vec<Trade>, StrategyError> {
    if table.is_empty() {
        return Ok(Vec::new());
    }

    let mut runner = PipelineRunner::new()
        .add_stage(SignalStage::new(source))
        .add_stage(ExitStage::new());
    runner.run(table, *config)
}
