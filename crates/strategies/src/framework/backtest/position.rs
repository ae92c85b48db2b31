//! 持仓与出场判定

use rust_scalp_domain::{Candle, ExitKind, ExitPriority, Signal, Trade, TradeSide};

/// 出场检查上下文，封装单根K线对当前方向的不利 / 有利价格
#[derive(Debug, Clone, Copy)]
pub struct ExitContext {
    side: TradeSide,
    /// 不利价格（触发止损用）：Long=low, Short=high
    adverse_price: f64,
    /// 有利价格（触发止盈用）：Long=high, Short=low
    favorable_price: f64,
}

impl ExitContext {
    pub fn new(side: TradeSide, candle: &Candle) -> Self {
        let (adverse_price, favorable_price) = match side {
            TradeSide::Long => (candle.low, candle.high),
            TradeSide::Short => (candle.high, candle.low),
        };
        Self {
            side,
            adverse_price,
            favorable_price,
        }
    }

    #[inline]
    pub fn is_take_profit_hit(&self, target: f64) -> bool {
        match self.side {
            TradeSide::Long => self.favorable_price >= target,
            TradeSide::Short => self.favorable_price <= target,
        }
    }

    /// 止损与移动止损共用
    #[inline]
    pub fn is_stop_loss_hit(&self, stop: f64) -> bool {
        match self.side {
            TradeSide::Long => self.adverse_price <= stop,
            TradeSide::Short => self.adverse_price >= stop,
        }
    }
}

/// 模拟器内部持仓，只在开仓到平仓之间存在
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub side: TradeSide,
    pub entry_price: f64,
    pub take_profit_price: f64,
    pub stop_loss_price: f64,
    pub entry_timestamp: i64,
    pub pump_percent: Option<f64>,
    trailing_fraction: Option<f64>,
    /// 开仓以来的最有利价格：Short 为最低价，Long 为最高价
    best_price: f64,
}

impl Position {
    pub fn open(signal: &Signal, trailing_fraction: Option<f64>) -> Self {
        Self {
            side: signal.side,
            entry_price: signal.entry_price,
            take_profit_price: signal.take_profit_price,
            stop_loss_price: signal.stop_loss_price,
            entry_timestamp: signal.entry_timestamp,
            pump_percent: signal.pump_percent,
            trailing_fraction: trailing_fraction.filter(|t| *t > 0.0),
            best_price: signal.entry_price,
        }
    }

    pub fn best_price(&self) -> f64 {
        self.best_price
    }

    /// 当前移动止损触发价
    pub fn trailing_stop_price(&self) -> Option<f64> {
        self.trailing_fraction.map(|t| match self.side {
            TradeSide::Short => self.best_price * (1.0 + t),
            TradeSide::Long => self.best_price * (1.0 - t),
        })
    }

    /// 用本根K线的有利极值更新 best_price
    pub fn update_best(&mut self, candle: &Candle) {
        self.best_price = match self.side {
            TradeSide::Short => self.best_price.min(candle.low),
            TradeSide::Long => self.best_price.max(candle.high),
        };
    }

    /// 以此前K线得到的触发价检查移动止损
    pub fn check_trailing_exit(&self, candle: &Candle) -> Option<(ExitKind, f64)> {
        let trigger = self.trailing_stop_price()?;
        ExitContext::new(self.side, candle)
            .is_stop_loss_hit(trigger)
            .then_some((ExitKind::TrailingStop, trigger))
    }

    /// 固定止损 / 止盈，按优先级判定
    pub fn check_fixed_exit(
        &self,
        candle: &Candle,
        priority: ExitPriority,
    ) -> Option<(ExitKind, f64)> {
        let ctx = ExitContext::new(self.side, candle);
        let stop = ctx
            .is_stop_loss_hit(self.stop_loss_price)
            .then_some((ExitKind::StopLoss, self.stop_loss_price));
        let target = ctx
            .is_take_profit_hit(self.take_profit_price)
            .then_some((ExitKind::TakeProfit, self.take_profit_price));

        match priority {
            ExitPriority::StopFirst => stop.or(target),
            ExitPriority::TargetFirst => target.or(stop),
        }
    }

    /// 平仓生成交易记录
    pub fn close(
        self,
        instrument_id: &str,
        exit_timestamp: i64,
        exit_kind: ExitKind,
        exit_price: f64,
        position_size: f64,
    ) -> Trade {
        Trade::close(
            instrument_id,
            self.side,
            self.entry_timestamp,
            exit_timestamp,
            exit_kind,
            self.entry_price,
            exit_price,
            position_size,
        )
        .with_pump_percent(self.pump_percent)
    }
}
