//! 金字塔加仓过滤

mod error;
mod filter;

pub use error::PyramidError;
pub use filter::{apply_pyramid, PyramidReport};
