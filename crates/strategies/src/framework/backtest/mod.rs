//! # 单标的回测模拟器
//!
//! 空仓 / 持仓两状态的确定性状态机，按K线顺序推进：
//! - [`types`] - 模拟参数
//! - [`position`] - 持仓与出场判定
//! - [`pipeline`] - 信号阶段 + 出场阶段
//! - [`simulator`] - 入口 [`simulate`]

pub mod pipeline;
mod position;
mod simulator;
mod types;

pub use position::{ExitContext, Position};
pub use simulator::simulate;
pub use types::SimulationConfig;
