//! 回测编排模块

pub mod dispatcher;
pub mod job;
pub mod runner;
