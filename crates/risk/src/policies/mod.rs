//! 风控策略模块

pub mod pyramid_policy;

pub use pyramid_policy::PyramidPolicy;
