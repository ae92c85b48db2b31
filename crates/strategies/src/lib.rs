//! # Rust Scalp Strategies
//!
//! 策略层：信号提供者抽象、条件组合、参考策略与单标的回测模拟器
//!
//! ## 核心组件
//! - `framework::signal_provider`: 增量 / 向量化两类信号提供者
//! - `framework::conditions`: 键不相交的条件字典合并 + 纯函数决策
//! - `framework::backtest`: 单标的持仓状态机（Pipeline 阶段实现）
//! - `implementations`: pump_short / ema_pump / vectorized 三个参考策略
//! - `config`: 策略参数、校验与信号源构建

pub mod config;
pub mod error;
pub mod framework;
pub mod implementations;

pub use config::{EntryCondition, StrategyConfig, StrategyKind, TrendFilter};
pub use error::StrategyError;
pub use framework::backtest::{simulate, SimulationConfig};
pub use framework::signal_provider::{
    IncrementalSignalProvider, PreparedSignals, SignalSource, VectorizedSignalProvider,
};
