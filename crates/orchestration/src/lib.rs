//! # Rust Scalp Orchestration
//!
//! 回测编排：多标的分发、单标的任务隔离、加仓过滤与汇总
//!
//! ## 核心组件
//! - `backtest::job`: 单标的任务，失败时返回空结果
//! - `backtest::dispatcher`: 并行 / 串行分发器
//! - `backtest::runner`: 端到端回测运行器

pub mod backtest;

pub use backtest::dispatcher::{Dispatcher, ParallelDispatcher, SerialDispatcher};
pub use backtest::job::{run_instrument, JobOutcome, JobStatus};
pub use backtest::runner::{BacktestReport, BacktestRunner, RunSettings};
