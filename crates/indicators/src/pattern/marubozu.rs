use serde::{Deserialize, Serialize};

use rust_scalp_domain::Candle;

use crate::Indicator;

/// 光头光脚K线判定结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarubozuOutput {
    /// 实体 / 振幅，振幅为0时为 None
    pub body_ratio: Option<f64>,
    pub is_marubozu: bool,
}

/// 光头光脚K线指标：实体占振幅比例不低于阈值
#[derive(Debug, Clone, Copy)]
pub struct MarubozuIndicator {
    threshold: f64,
}

impl Default for MarubozuIndicator {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl MarubozuIndicator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn evaluate(&self, candle: &Candle) -> MarubozuOutput {
        let body_ratio = candle.body_ratio();
        MarubozuOutput {
            body_ratio,
            is_marubozu: body_ratio.is_some_and(|r| r >= self.threshold),
        }
    }
}

impl Indicator for MarubozuIndicator {
    type Input = Candle;
    type Output = MarubozuOutput;

    fn update(&mut self, candle: Candle) -> MarubozuOutput {
        self.evaluate(&candle)
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marubozu_ratio() {
        let indicator = MarubozuIndicator::new(0.8);
        // 实体 9 / 振幅 10
        let full = indicator.evaluate(&Candle::new(0, 100.0, 110.0, 100.0, 109.0));
        assert!(full.is_marubozu);

        // 实体 5 / 振幅 10
        let half = indicator.evaluate(&Candle::new(0, 100.0, 110.0, 100.0, 105.0));
        assert!(!half.is_marubozu);
    }

    #[test]
    fn test_bearish_body_counts() {
        let indicator = MarubozuIndicator::new(0.8);
        let red = indicator.evaluate(&Candle::new(0, 110.0, 110.0, 100.0, 101.0));
        assert!(red.is_marubozu);
    }

    #[test]
    fn test_zero_range_is_not_marubozu() {
        let mut indicator = MarubozuIndicator::default();
        let doji = indicator.update(Candle::new(0, 100.0, 100.0, 100.0, 100.0));
        assert_eq!(doji.body_ratio, None);
        assert!(!doji.is_marubozu);
    }
}
