//! # Rust Scalp Core
//!
//! 核心基础设施：环境配置、错误类型、日志

pub mod config;
pub mod error;
pub mod logger;
