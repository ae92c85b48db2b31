//! 模拟参数

use serde::{Deserialize, Serialize};

use rust_scalp_domain::ExitPriority;

/// 默认下注金额
pub const DEFAULT_POSITION_SIZE: f64 = 7.0;

/// 单标的模拟参数，所有 worker 共享同一份只读拷贝
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 每笔交易的名义仓位，pnl_currency = pnl_fraction × position_size
    pub position_size: f64,
    /// 移动止损比例，None 为关闭
    pub trailing_stop: Option<f64>,
    /// 止损 / 止盈同时触及时的判定顺序
    pub exit_priority: ExitPriority,
    /// 信号未指定时是否检查开仓K线
    pub check_entry_candle: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            position_size: DEFAULT_POSITION_SIZE,
            trailing_stop: None,
            exit_priority: ExitPriority::StopFirst,
            check_entry_candle: false,
        }
    }
}

impl SimulationConfig {
    pub fn with_trailing_stop(mut self, fraction: f64) -> Self {
        self.trailing_stop = (fraction > 0.0).then_some(fraction);
        self
    }

    pub fn with_exit_priority(mut self, priority: ExitPriority) -> Self {
        self.exit_priority = priority;
        self
    }

    pub fn with_position_size(mut self, size: f64) -> Self {
        self.position_size = size;
        self
    }
}
