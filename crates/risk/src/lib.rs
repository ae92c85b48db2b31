//! # Rust Scalp Risk
//!
//! 风控：跨标的加仓（金字塔）过滤
//!
//! ## 核心组件
//! - `policies::PyramidPolicy`: 同一基础标的的最大持仓数与加仓价格要求
//! - `pyramid::apply_pyramid`: 按开仓时间顺序的单遍准入过滤

pub mod policies;
pub mod pyramid;

pub use policies::PyramidPolicy;
pub use pyramid::{apply_pyramid, PyramidError, PyramidReport};
