//! 策略框架

pub mod backtest;
pub mod conditions;
pub mod signal_provider;
