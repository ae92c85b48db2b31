//! # Pipeline回测框架
//!
//! 每根K线依次经过各阶段，阶段之间只通过 [`BacktestContext`] 传递状态。
//!
//! ## 核心组件
//! - [`BacktestStage`] - 阶段trait
//! - [`BacktestContext`] - 统一状态容器
//! - [`PipelineRunner`] - Pipeline执行器

mod context;
mod runner;
mod stage;
pub mod stages;

pub use context::BacktestContext;
pub use runner::PipelineRunner;
pub use stage::{BacktestStage, StageResult};
