//! 值对象

pub mod signal;

pub use signal::Signal;
