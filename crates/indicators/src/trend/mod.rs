pub mod ema_chain;
pub mod ema_indicator;

pub use ema_chain::*;
pub use ema_indicator::*;
