//! 加仓限额策略

use serde::{Deserialize, Serialize};

/// 加仓限额策略
///
/// 同一基础标的最多同时持有 `max_positions` 笔；已有持仓时，
/// 新开仓价必须高于当前持仓均价 × (1 + avg_threshold) 才允许加仓
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PyramidPolicy {
    pub max_positions: usize,
    /// 小数，0.10 = 10%
    pub avg_threshold: f64,
}

impl Default for PyramidPolicy {
    fn default() -> Self {
        Self {
            max_positions: 1,
            avg_threshold: 0.0,
        }
    }
}

impl PyramidPolicy {
    pub fn new(max_positions: usize, avg_threshold: f64) -> Self {
        Self {
            max_positions,
            avg_threshold,
        }
    }

    /// 检查参数
    pub fn validate(&self) -> Result<(), String> {
        if self.max_positions == 0 {
            return Err("max_positions 必须大于 0".to_string());
        }
        if !self.avg_threshold.is_finite() || self.avg_threshold < 0.0 {
            return Err(format!(
                "avg_threshold 必须为非负有限数, got {}",
                self.avg_threshold
            ));
        }
        Ok(())
    }

    /// 给定当前持仓的开仓价，判断新开仓是否准入，准入时返回加仓层级
    pub fn admit_level(&self, open_entry_prices: &[f64], entry_price: f64) -> Option<u32> {
        let count = open_entry_prices.len();
        if count == 0 {
            return Some(1);
        }
        if count >= self.max_positions {
            return None;
        }
        let avg = open_entry_prices.iter().sum::<f64>() / count as f64;
        (entry_price > avg * (1.0 + self.avg_threshold)).then_some(count as u32 + 1)
    }
}
