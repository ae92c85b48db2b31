//! 业务实体

pub mod candle;
pub mod trade;

pub use candle::{Candle, CandleError, CandleTable};
pub use trade::{base_instrument, Trade};
