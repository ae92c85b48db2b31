//! 回测汇总
//!
//! 全部为对准入交易列表的简单归约：
//! - 胜率：pnl > 0 为盈利，其余（含 0）为亏损
//! - 最大回撤：按平仓顺序累计盈亏曲线的峰谷差（金额）
//! - 分标的：按完整标的标识汇总盈亏，取前 5 / 后 5

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use rust_scalp_domain::Trade;

/// 分标的排行的条数
pub const TOP_SYMBOLS: usize = 5;

/// 单个标的的汇总盈亏
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolPnl {
    pub symbol: String,
    pub trades: usize,
    pub pnl: f64,
}

/// 回测汇总统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BacktestSummary {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// 百分比
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_pnl: f64,
    pub best_trade: Option<f64>,
    pub worst_trade: Option<f64>,
    pub max_drawdown: f64,
    /// 加仓层级 -> 交易数
    pub trades_by_level: BTreeMap<u32, usize>,
    pub first_entry: Option<DateTime<Utc>>,
    pub last_entry: Option<DateTime<Utc>>,
    /// 首尾开仓日期跨度（含首尾两天）
    pub total_days: i64,
    /// 盈亏最高的标的，降序
    pub top_symbols: Vec<SymbolPnl>,
    /// 盈亏最低的标的，升序
    pub bottom_symbols: Vec<SymbolPnl>,
}

impl BacktestSummary {
    pub fn from_trades(trades: &[Trade]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }

        let total_trades = trades.len();
        let wins = trades.iter().filter(|t| t.is_win()).count();
        let losses = total_trades - wins;
        let total_pnl: f64 = trades.iter().map(|t| t.pnl_currency).sum();

        let mut trades_by_level = BTreeMap::new();
        for trade in trades {
            *trades_by_level.entry(trade.pyramid_level).or_insert(0) += 1;
        }

        let first_ts = trades.iter().map(|t| t.entry_timestamp).min();
        let last_ts = trades.iter().map(|t| t.entry_timestamp).max();
        let first_entry = first_ts.and_then(DateTime::<Utc>::from_timestamp_millis);
        let last_entry = last_ts.and_then(DateTime::<Utc>::from_timestamp_millis);
        let total_days = match (first_entry, last_entry) {
            (Some(first), Some(last)) => (last - first).num_days() + 1,
            _ => 0,
        };

        let (top_symbols, bottom_symbols) = rank_symbols(trades);

        Self {
            total_trades,
            wins,
            losses,
            win_rate: wins as f64 / total_trades as f64 * 100.0,
            total_pnl,
            avg_pnl: total_pnl / total_trades as f64,
            best_trade: trades.iter().map(|t| t.pnl_currency).reduce(f64::max),
            worst_trade: trades.iter().map(|t| t.pnl_currency).reduce(f64::min),
            max_drawdown: max_drawdown(trades),
            trades_by_level,
            first_entry,
            last_entry,
            total_days,
            top_symbols,
            bottom_symbols,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_trades == 0
    }

    /// 开仓日期范围，如 `2024-01-01 to 2024-01-07`
    pub fn date_range(&self) -> Option<String> {
        let (first, last) = (self.first_entry?, self.last_entry?);
        Some(format!(
            "{} to {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        ))
    }
}

/// 按平仓顺序累计盈亏，返回最大峰谷差
fn max_drawdown(trades: &[Trade]) -> f64 {
    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by(|a, b| {
        a.exit_timestamp
            .cmp(&b.exit_timestamp)
            .then(a.entry_timestamp.cmp(&b.entry_timestamp))
            .then_with(|| a.instrument_id.cmp(&b.instrument_id))
    });

    let mut equity = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_drawdown = 0.0_f64;
    for trade in ordered {
        equity += trade.pnl_currency;
        peak = peak.max(equity);
        max_drawdown = max_drawdown.max(peak - equity);
    }
    max_drawdown
}

fn rank_symbols(trades: &[Trade]) -> (Vec<SymbolPnl>, Vec<SymbolPnl>) {
    let mut by_symbol: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for trade in trades {
        let entry = by_symbol.entry(trade.instrument_id.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += trade.pnl_currency;
    }

    let mut ranked: Vec<SymbolPnl> = by_symbol
        .into_iter()
        .map(|(symbol, (trades, pnl))| SymbolPnl {
            symbol: symbol.to_string(),
            trades,
            pnl,
        })
        .collect();
    // 同盈亏时按标的名保持稳定
    ranked.sort_by(|a, b| b.pnl.total_cmp(&a.pnl).then_with(|| a.symbol.cmp(&b.symbol)));

    let top = ranked.iter().take(TOP_SYMBOLS).cloned().collect();
    let bottom = ranked.iter().rev().take(TOP_SYMBOLS).cloned().collect();
    (top, bottom)
}

impl fmt::Display for BacktestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Trades: {}", self.total_trades)?;
        writeln!(
            f,
            "Win Rate:     {:.2}% ({} W / {} L)",
            self.win_rate, self.wins, self.losses
        )?;
        writeln!(f, "Total PnL:    ${:.2}", self.total_pnl)?;
        writeln!(f, "Avg PnL:      ${:.4}", self.avg_pnl)?;
        if let (Some(best), Some(worst)) = (self.best_trade, self.worst_trade) {
            writeln!(f, "Best / Worst: ${:.4} / ${:.4}", best, worst)?;
        }
        writeln!(f, "Max Drawdown: ${:.2}", self.max_drawdown)?;
        if let Some(range) = self.date_range() {
            writeln!(f, "Date Range:   {} ({} days)", range, self.total_days)?;
        }
        let levels: Vec<String> = self
            .trades_by_level
            .iter()
            .map(|(level, count)| format!("L{}={}", level, count))
            .collect();
        writeln!(f, "Levels:       {}", levels.join(" "))?;

        writeln!(f, "\nTop {} Winners (by symbol):", TOP_SYMBOLS)?;
        for s in &self.top_symbols {
            writeln!(f, "  {:<24} {:>10.4} ({} trades)", s.symbol, s.pnl, s.trades)?;
        }
        writeln!(f, "\nTop {} Losers (by symbol):", TOP_SYMBOLS)?;
        for s in &self.bottom_symbols {
            writeln!(f, "  {:<24} {:>10.4} ({} trades)", s.symbol, s.pnl, s.trades)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_scalp_domain::{ExitKind, TradeSide};

    const DAY_MS: i64 = 86_400_000;

    fn trade(symbol: &str, entry_ts: i64, exit_ts: i64, exit_price: f64, level: u32) -> Trade {
        let mut trade = Trade::close(
            symbol,
            TradeSide::Short,
            entry_ts,
            exit_ts,
            ExitKind::TakeProfit,
            100.0,
            exit_price,
            10.0,
        );
        trade.pyramid_level = level;
        trade
    }

    #[test]
    fn test_empty_summary() {
        let summary = BacktestSummary::from_trades(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.date_range(), None);
    }

    #[test]
    fn test_basic_statistics() {
        // pnl: +0.4, -0.2, 0.0, +0.1
        let trades = vec![
            trade("BTCUSDT_1m", 0, 10, 96.0, 1),
            trade("ETHUSDT_1m", 5, 20, 102.0, 1),
            trade("ETHUSDT_1m", 30, 40, 100.0, 1),
            trade("BTCUSDT_30s", 2 * DAY_MS, 2 * DAY_MS + 10, 99.0, 2),
        ];
        let summary = BacktestSummary::from_trades(&trades);

        assert_eq!(summary.total_trades, 4);
        assert_eq!(summary.wins, 2);
        // 盈亏为 0 计为亏损
        assert_eq!(summary.losses, 2);
        assert_relative_eq!(summary.win_rate, 50.0);
        assert_relative_eq!(summary.total_pnl, 0.3, epsilon = 1e-9);
        assert_relative_eq!(summary.avg_pnl, 0.075, epsilon = 1e-9);
        assert_relative_eq!(summary.best_trade.unwrap(), 0.4, epsilon = 1e-9);
        assert_relative_eq!(summary.worst_trade.unwrap(), -0.2, epsilon = 1e-9);
        assert_eq!(summary.trades_by_level.get(&1), Some(&3));
        assert_eq!(summary.trades_by_level.get(&2), Some(&1));
        assert_eq!(summary.total_days, 3);
        assert_eq!(
            summary.date_range().as_deref(),
            Some("1970-01-01 to 1970-01-03")
        );
    }

    #[test]
    fn test_max_drawdown_in_exit_order() {
        // 平仓顺序：+0.4, -0.2, -0.3, +0.1
        let trades = vec![
            trade("A_1m", 0, 10, 96.0, 1),
            trade("B_1m", 1, 30, 103.0, 1),
            trade("C_1m", 2, 20, 102.0, 1),
            trade("D_1m", 3, 40, 99.0, 1),
        ];
        let summary = BacktestSummary::from_trades(&trades);
        assert_relative_eq!(summary.max_drawdown, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_symbol_ranking() {
        let trades: Vec<Trade> = (0..7)
            .map(|i| trade(&format!("S{}_1m", i), i, i + 1, 100.0 - i as f64, 1))
            .collect();
        let summary = BacktestSummary::from_trades(&trades);

        let top: Vec<&str> = summary.top_symbols.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(top, vec!["S6_1m", "S5_1m", "S4_1m", "S3_1m", "S2_1m"]);
        let bottom: Vec<&str> = summary
            .bottom_symbols
            .iter()
            .map(|s| s.symbol.as_str())
            .collect();
        assert_eq!(bottom, vec!["S0_1m", "S1_1m", "S2_1m", "S3_1m", "S4_1m"]);
    }

    #[test]
    fn test_display_contains_headline() {
        let summary = BacktestSummary::from_trades(&[trade("A_1m", 0, 10, 96.0, 1)]);
        let text = summary.to_string();
        assert!(text.contains("Total Trades: 1"));
        assert!(text.contains("Win Rate:     100.00% (1 W / 0 L)"));
    }
}
