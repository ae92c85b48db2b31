//! SignalStage - 信号生成阶段

use rust_scalp_domain::{CandleTable, Signal};
use tracing::debug;

use crate::error::StrategyError;
use crate::framework::backtest::pipeline::{BacktestContext, BacktestStage, StageResult};
use crate::framework::backtest::position::Position;
use crate::framework::signal_provider::{PreparedSignals, SignalSource};

/// 信号生成阶段
///
/// 空仓时向信号源取信号并开仓，持仓时只让增量信号源观察K线
pub struct SignalStage {
    source: SignalSource,
    prepared: Option<PreparedSignals>,
}

impl SignalStage {
    pub fn new(source: SignalSource) -> Self {
        Self {
            source,
            prepared: None,
        }
    }

    fn next_signal(&mut self, ctx: &BacktestContext) -> Option<Signal> {
        match &mut self.source {
            SignalSource::Incremental(provider) => provider.advance(&ctx.candle),
            SignalSource::Vectorized(provider) => self
                .prepared
                .as_ref()
                .filter(|p| p.is_entry(ctx.candle_index))
                .map(|_| provider.signal_at(&ctx.candle)),
        }
    }
}

impl BacktestStage for SignalStage {
    fn name(&self) -> &'static str {
        "SignalStage"
    }

    fn prepare(&mut self, table: &CandleTable) -> Result<(), StrategyError> {
        if let SignalSource::Vectorized(provider) = &self.source {
            let prepared = provider.prepare(table);
            prepared.ensure_len(table.len())?;
            debug!(
                "向量化信号准备完成: inst_id={}, strategy={}, signals={}",
                table.instrument_id(),
                provider.name(),
                prepared.count()
            );
            self.prepared = Some(prepared);
        }
        Ok(())
    }

    fn process(&mut self, ctx: &mut BacktestContext) -> Result<StageResult, StrategyError> {
        if ctx.has_position() {
            if let SignalSource::Incremental(provider) = &mut self.source {
                provider.observe(&ctx.candle);
            }
            return Ok(StageResult::Continue);
        }

        let Some(signal) = self.next_signal(ctx) else {
            return Ok(StageResult::Skip);
        };
        if !signal.is_valid() {
            return Err(StrategyError::InvalidSignal {
                index: ctx.candle_index,
                reason: format!(
                    "entry={}, tp={}, sl={}",
                    signal.entry_price, signal.take_profit_price, signal.stop_loss_price
                ),
            });
        }

        let position = Position::open(&signal, ctx.config.trailing_stop);
        let check_entry = signal
            .check_entry_candle
            .unwrap_or(ctx.config.check_entry_candle);
        let instant = check_entry
            .then(|| position.check_fixed_exit(&ctx.candle, ctx.config.exit_priority))
            .flatten();

        ctx.position = Some(position);

        match instant {
            Some((kind, price)) => {
                let kind = kind.to_instant();
                ctx.close_position(kind, price);
                Ok(StageResult::Exit { kind, price })
            }
            None => Ok(StageResult::Skip),
        }
    }
}
