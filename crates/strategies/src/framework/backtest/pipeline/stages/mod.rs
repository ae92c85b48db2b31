//! 内置阶段

mod exit;
mod signal;

pub use exit::ExitStage;
pub use signal::SignalStage;
