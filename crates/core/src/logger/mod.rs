//! 日志初始化

mod setup;

pub use setup::setup_logging;
