//! 交易相关枚举

use serde::{Deserialize, Serialize};

/// 交易方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    /// 做多
    Long,
    /// 做空
    #[default]
    Short,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Long => "LONG",
            TradeSide::Short => "SHORT",
        }
    }

    /// 以入场价计算收益率，做空为 (entry - exit) / entry
    pub fn pnl_fraction(&self, entry_price: f64, exit_price: f64) -> f64 {
        match self {
            TradeSide::Long => (exit_price - entry_price) / entry_price,
            TradeSide::Short => (entry_price - exit_price) / entry_price,
        }
    }
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TradeSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LONG" | "BUY" => Ok(TradeSide::Long),
            "SHORT" | "SELL" => Ok(TradeSide::Short),
            _ => Err(format!("Unknown trade side: {}", s)),
        }
    }
}

/// 平仓类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitKind {
    /// 止盈
    #[serde(rename = "TP")]
    TakeProfit,
    /// 止损
    #[serde(rename = "SL")]
    StopLoss,
    /// 信号K线内即时止盈
    #[serde(rename = "TP_INSTANT")]
    InstantTakeProfit,
    /// 信号K线内即时止损
    #[serde(rename = "SL_INSTANT")]
    InstantStopLoss,
    /// 移动止损
    #[serde(rename = "TSL")]
    TrailingStop,
}

impl ExitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitKind::TakeProfit => "TP",
            ExitKind::StopLoss => "SL",
            ExitKind::InstantTakeProfit => "TP_INSTANT",
            ExitKind::InstantStopLoss => "SL_INSTANT",
            ExitKind::TrailingStop => "TSL",
        }
    }

    /// 是否在开仓K线内平仓
    pub fn is_instant(&self) -> bool {
        matches!(self, ExitKind::InstantTakeProfit | ExitKind::InstantStopLoss)
    }

    /// 是否属于止损类（含即时止损）
    pub fn is_stop_loss(&self) -> bool {
        matches!(self, ExitKind::StopLoss | ExitKind::InstantStopLoss)
    }

    /// 转为即时版本，移动止损没有即时版本
    pub fn to_instant(self) -> Self {
        match self {
            ExitKind::TakeProfit => ExitKind::InstantTakeProfit,
            ExitKind::StopLoss => ExitKind::InstantStopLoss,
            other => other,
        }
    }
}

impl std::fmt::Display for ExitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TP" => Ok(ExitKind::TakeProfit),
            "SL" => Ok(ExitKind::StopLoss),
            "TP_INSTANT" => Ok(ExitKind::InstantTakeProfit),
            "SL_INSTANT" => Ok(ExitKind::InstantStopLoss),
            "TSL" => Ok(ExitKind::TrailingStop),
            _ => Err(format!("Unknown exit kind: {}", s)),
        }
    }
}

/// 同一根K线同时触及止损和止盈时的判定顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExitPriority {
    /// 止损优先（保守）
    #[default]
    StopFirst,
    /// 止盈优先
    TargetFirst,
}

impl ExitPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitPriority::StopFirst => "stop_first",
            ExitPriority::TargetFirst => "target_first",
        }
    }
}
