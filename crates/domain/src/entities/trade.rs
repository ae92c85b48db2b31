//! 成交记录实体

use serde::{Deserialize, Serialize};

use crate::enums::{ExitKind, TradeSide};

/// 去掉周期/变体后缀的基础标的，如 `BTCUSDT_30s -> BTCUSDT`
pub fn base_instrument(instrument_id: &str) -> &str {
    instrument_id.split('_').next().unwrap_or(instrument_id)
}

/// 一笔已平仓交易
///
/// 除 `pyramid_level` 外创建后不可变，层级只由加仓过滤器赋值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// 标的标识（含周期后缀）
    #[serde(rename = "symbol")]
    pub instrument_id: String,
    pub side: TradeSide,
    /// 开仓时间戳 (毫秒)
    pub entry_timestamp: i64,
    /// 平仓时间戳 (毫秒)
    pub exit_timestamp: i64,
    #[serde(rename = "type")]
    pub exit_kind: ExitKind,
    pub entry_price: f64,
    pub exit_price: f64,
    /// 收益率（小数）
    pub pnl_fraction: f64,
    /// 收益金额 = 收益率 × 仓位
    pub pnl_currency: f64,
    /// 加仓层级，1 为首仓
    pub pyramid_level: u32,
    /// 信号K线涨幅，仅用于诊断
    pub pump_percent: Option<f64>,
}

impl Trade {
    /// 按平仓结果构造交易，收益按方向计算
    #[allow(clippy::too_many_arguments)]
    pub fn close(
        instrument_id: impl Into<String>,
        side: TradeSide,
        entry_timestamp: i64,
        exit_timestamp: i64,
        exit_kind: ExitKind,
        entry_price: f64,
        exit_price: f64,
        position_size: f64,
    ) -> Self {
        let pnl_fraction = side.pnl_fraction(entry_price, exit_price);
        Self {
            instrument_id: instrument_id.into(),
            side,
            entry_timestamp,
            exit_timestamp,
            exit_kind,
            entry_price,
            exit_price,
            pnl_fraction,
            pnl_currency: pnl_fraction * position_size,
            pyramid_level: 1,
            pump_percent: None,
        }
    }

    pub fn with_pump_percent(mut self, pump_percent: Option<f64>) -> Self {
        self.pump_percent = pump_percent;
        self
    }

    pub fn base_instrument(&self) -> &str {
        base_instrument(&self.instrument_id)
    }

    /// 持仓时长（分钟）
    pub fn duration_minutes(&self) -> f64 {
        (self.exit_timestamp - self.entry_timestamp) as f64 / 60_000.0
    }

    pub fn is_win(&self) -> bool {
        self.pnl_currency > 0.0
    }
}
