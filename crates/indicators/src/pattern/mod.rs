pub mod marubozu;

pub use marubozu::*;
