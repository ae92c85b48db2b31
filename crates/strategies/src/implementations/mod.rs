//! 参考策略
//!
//! - [`PumpShortStrategy`] - 盘中触及急涨阈值即做空（增量）
//! - [`ema_pump_provider`] - EMA 链 + 急涨/光头光脚条件组合（增量）
//! - [`VectorizedPumpStrategy`] - 整表预计算信号列（向量化）

mod ema_pump;
mod pump_short;
mod vectorized;

pub use ema_pump::{ema_pump_provider, EmaChainConditions, EmaPumpDecision, MarubozuConditions};
pub use pump_short::PumpShortStrategy;
pub use vectorized::VectorizedPumpStrategy;
