//! 策略层错误

use thiserror::Error;

/// 策略计算 / 参数错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("策略参数非法: {0}")]
    InvalidConfig(String),

    #[error("条件键重复: key={key}, sets=({first}, {second})")]
    DuplicateConditionKey {
        key: &'static str,
        first: &'static str,
        second: &'static str,
    },

    #[error("信号列长度不匹配: expected={expected}, actual={actual}")]
    SignalColumnLength { expected: usize, actual: usize },

    #[error("信号非法: index={index}, {reason}")]
    InvalidSignal { index: usize, reason: String },
}
