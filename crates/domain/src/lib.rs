//! # Rust Scalp Domain
//!
//! 领域模型层 - 纯粹的业务数据结构，不依赖任何基础设施
//!
//! ## 模块组织
//!
//! - `entities`: 业务实体，如 Candle, CandleTable, Trade
//! - `value_objects`: 值对象，如 Signal
//! - `enums`: 业务枚举，如 TradeSide, ExitKind, ExitPriority

pub mod entities;
pub mod enums;
pub mod value_objects;

// 重新导出核心类型
pub use entities::{base_instrument, Candle, CandleError, CandleTable, Trade};
pub use enums::{ExitKind, ExitPriority, TradeSide};
pub use value_objects::Signal;
