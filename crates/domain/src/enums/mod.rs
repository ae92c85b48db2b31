//! 业务枚举

pub mod trade_enums;

pub use trade_enums::*;
