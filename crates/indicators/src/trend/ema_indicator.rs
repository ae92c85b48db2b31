use ta::indicators::ExponentialMovingAverage;
use ta::{Next, Reset};

use crate::Indicator;

/// 流式 EMA，k = 2 / (n + 1)，以第一根收盘价作为初值
#[derive(Debug, Clone)]
pub struct EmaIndicator {
    inner: ExponentialMovingAverage,
    samples: usize,
}

impl EmaIndicator {
    /// 周期为0时返回 None
    pub fn new(period: usize) -> Option<Self> {
        let inner = ExponentialMovingAverage::new(period).ok()?;
        Some(Self { inner, samples: 0 })
    }

    /// 已输入的样本数
    pub fn samples(&self) -> usize {
        self.samples
    }
}

impl Indicator for EmaIndicator {
    type Input = f64;
    type Output = f64;

    fn update(&mut self, input: f64) -> f64 {
        self.samples += 1;
        self.inner.next(input)
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.samples = 0;
    }
}

/// 整段序列的 EMA，样本数不足 `min_periods` 的位置为 None
///
/// 递推方式与 [`EmaIndicator`] 相同，只是前段被屏蔽
pub fn ema_series(values: &[f64], period: usize, min_periods: usize) -> Vec<Option<f64>> {
    let Some(mut ema) = EmaIndicator::new(period) else {
        return vec![None; values.len()];
    };
    values
        .iter()
        .map(|v| {
            let out = ema.update(*v);
            (ema.samples() >= min_periods).then_some(out)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ema_seeded_by_first_value() {
        let mut ema = EmaIndicator::new(3).unwrap();
        assert_relative_eq!(ema.update(10.0), 10.0);
        // k = 0.5
        assert_relative_eq!(ema.update(20.0), 15.0);
        assert_relative_eq!(ema.update(5.0), 10.0);
        assert_eq!(ema.samples(), 3);

        ema.reset();
        assert_eq!(ema.samples(), 0);
        assert_relative_eq!(ema.update(7.0), 7.0);
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(EmaIndicator::new(0).is_none());
    }

    #[test]
    fn test_ema_series_masks_warmup() {
        let series = ema_series(&[10.0, 20.0, 5.0, 5.0], 3, 3);
        assert_eq!(series[0], None);
        assert_eq!(series[1], None);
        assert_relative_eq!(series[2].unwrap(), 10.0);
        assert_relative_eq!(series[3].unwrap(), 7.5);
    }
}
