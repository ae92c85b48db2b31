use std::collections::HashMap;

use tracing::{debug, info};

use rust_scalp_domain::{base_instrument, Trade};

use super::error::PyramidError;
use crate::policies::PyramidPolicy;

/// 已准入且尚未平仓的持仓
#[derive(Debug, Clone, Copy)]
struct OpenPosition {
    entry_price: f64,
    exit_timestamp: i64,
}

/// 过滤结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PyramidReport {
    /// 准入交易，按 (entry_ts, exit_ts, symbol) 排序，已赋加仓层级
    pub admitted: Vec<Trade>,
    /// 被拒绝的交易数
    pub rejected: usize,
}

/// 对全部标的的原始交易做单遍加仓准入
///
/// 1. 按 (entry_timestamp, exit_timestamp, instrument_id) 升序排序
/// 2. 每个基础标的维护一张已准入持仓表，先移除 exit ≤ 当前 entry 的持仓
/// 3. 表为空直接准入（层级 1）；未满时开仓价需高于均价 × (1 + avg_threshold)
/// 4. 被拒绝的交易直接丢弃，不再重试
pub fn apply_pyramid(
    mut trades: Vec<Trade>,
    policy: &PyramidPolicy,
) -> Result<PyramidReport, PyramidError> {
    policy.validate().map_err(PyramidError::InvalidPolicy)?;
    for trade in &trades {
        validate_trade(trade)?;
    }

    trades.sort_by(|a, b| {
        a.entry_timestamp
            .cmp(&b.entry_timestamp)
            .then(a.exit_timestamp.cmp(&b.exit_timestamp))
            .then_with(|| a.instrument_id.cmp(&b.instrument_id))
    });

    let total = trades.len();
    let mut open_positions: HashMap<String, Vec<OpenPosition>> = HashMap::new();
    let mut admitted = Vec::with_capacity(total);

    for mut trade in trades {
        let group = open_positions
            .entry(base_instrument(&trade.instrument_id).to_string())
            .or_default();
        group.retain(|p| p.exit_timestamp > trade.entry_timestamp);

        let open_prices: Vec<f64> = group.iter().map(|p| p.entry_price).collect();
        match policy.admit_level(&open_prices, trade.entry_price) {
            Some(level) => {
                trade.pyramid_level = level;
                group.push(OpenPosition {
                    entry_price: trade.entry_price,
                    exit_timestamp: trade.exit_timestamp,
                });
                admitted.push(trade);
            }
            None => {
                debug!(
                    "[加仓过滤] 拒绝: symbol={}, entry_ts={}, price={}, open={}",
                    trade.instrument_id,
                    trade.entry_timestamp,
                    trade.entry_price,
                    open_prices.len()
                );
            }
        }
    }

    let rejected = total - admitted.len();
    info!(
        "[加仓过滤] 完成: raw={}, admitted={}, rejected={}, max_pos={}, avg_thresh={}",
        total,
        admitted.len(),
        rejected,
        policy.max_positions,
        policy.avg_threshold
    );
    Ok(PyramidReport { admitted, rejected })
}

fn validate_trade(trade: &Trade) -> Result<(), PyramidError> {
    if !trade.entry_price.is_finite() {
        return Err(PyramidError::InvalidEntryPrice {
            symbol: trade.instrument_id.clone(),
            entry_timestamp: trade.entry_timestamp,
            price: trade.entry_price,
        });
    }
    if trade.exit_timestamp < trade.entry_timestamp {
        return Err(PyramidError::ExitBeforeEntry {
            symbol: trade.instrument_id.clone(),
            entry_timestamp: trade.entry_timestamp,
            exit_timestamp: trade.exit_timestamp,
        });
    }
    Ok(())
}
