//! 配置管理模块

pub mod environment;

// 重新导出
pub use environment::*;
