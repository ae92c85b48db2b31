//! 交易明细 CSV
//!
//! 列：symbol, level, side, entry_time, exit_time, type, entry_price, exit_price,
//! pnl_percent, pnl_usd, duration_min；时间为 RFC 3339 UTC

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use rust_scalp_domain::Trade;

/// 默认输出文件
pub const DEFAULT_LEDGER_PATH: &str = "backtest_results_pump.csv";

/// CSV 中的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub symbol: String,
    pub level: u32,
    pub side: &'static str,
    pub entry_time: String,
    pub exit_time: String,
    #[serde(rename = "type")]
    pub exit_type: &'static str,
    pub entry_price: f64,
    pub exit_price: f64,
    /// 百分比
    pub pnl_percent: f64,
    pub pnl_usd: f64,
    pub duration_min: f64,
}

impl LedgerRow {
    pub fn from_trade(trade: &Trade) -> Result<Self> {
        Ok(Self {
            symbol: trade.instrument_id.clone(),
            level: trade.pyramid_level,
            side: trade.side.as_str(),
            entry_time: format_millis(trade.entry_timestamp)?,
            exit_time: format_millis(trade.exit_timestamp)?,
            exit_type: trade.exit_kind.as_str(),
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            pnl_percent: trade.pnl_fraction * 100.0,
            pnl_usd: trade.pnl_currency,
            duration_min: trade.duration_minutes(),
        })
    }
}

fn format_millis(ts: i64) -> Result<String> {
    DateTime::<Utc>::from_timestamp_millis(ts)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| anyhow!("时间戳超出范围: {}", ts))
}

/// 写入任意 writer，返回写入行数
pub fn write_ledger<W: Write>(writer: W, trades: &[Trade]) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for trade in trades {
        csv_writer.serialize(LedgerRow::from_trade(trade)?)?;
    }
    csv_writer.flush()?;
    Ok(trades.len())
}

/// 写入 CSV 文件
pub fn write_ledger_csv(path: &Path, trades: &[Trade]) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("创建结果文件失败: {}", path.display()))?;
    let rows = write_ledger(file, trades)?;
    info!("交易明细已写入: path={}, rows={}", path.display(), rows);
    Ok(rows)
}
