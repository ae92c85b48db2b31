//! Pipeline阶段trait定义

use rust_scalp_domain::{CandleTable, ExitKind};

use super::context::BacktestContext;
use crate::error::StrategyError;

/// 阶段执行结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageResult {
    /// 继续执行下一阶段
    Continue,
    /// 跳过后续阶段（本K线处理完成）
    Skip,
    /// 触发平仓出场
    Exit { kind: ExitKind, price: f64 },
}

/// 回测Pipeline阶段trait
///
/// 所有阶段实现此trait，Pipeline按顺序执行各阶段
pub trait BacktestStage: Send {
    /// 阶段名称（用于调试和日志）
    fn name(&self) -> &'static str;

    /// 回测开始前调用一次，可在此预计算整张表
    fn prepare(&mut self, _table: &CandleTable) -> Result<(), StrategyError> {
        Ok(())
    }

    /// 处理当前K线
    fn process(&mut self, ctx: &mut BacktestContext) -> Result<StageResult, StrategyError>;
}
