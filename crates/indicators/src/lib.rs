//! # Rust Scalp Indicators
//!
//! 技术指标库：趋势（EMA 链）、动量（急涨急跌）、形态（光头光脚K线）

pub mod momentum;
pub mod pattern;
pub mod trend;

// 重新导出所有子模块的类型
pub use momentum::*;
pub use pattern::*;
pub use trend::*;

// 统一指标接口
pub trait Indicator {
    type Input;
    type Output;

    fn update(&mut self, input: Self::Input) -> Self::Output;
    fn reset(&mut self);
}
