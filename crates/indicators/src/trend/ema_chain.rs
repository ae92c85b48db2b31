//! EMA 链趋势状态
//!
//! 小周期链 9/20/50/100/200 与大周期链 300/500/1000/2000/5000，
//! 相邻两条 EMA 全部按同一方向排列（带容差）即为多头/空头链

use serde::{Deserialize, Serialize};

use crate::trend::ema_indicator::EmaIndicator;
use crate::Indicator;

/// 全部 EMA 周期，前 5 个为小周期链，后 5 个为大周期链
pub const EMA_CHAIN_PERIODS: [usize; 10] = [9, 20, 50, 100, 200, 300, 500, 1000, 2000, 5000];

const SMALL_CHAIN: std::ops::Range<usize> = 0..5;
const BIG_CHAIN: std::ops::Range<usize> = 5..10;

// 容差为百分数
const SMALL_BULL_TOLERANCE_PCT: f64 = 0.00001;
const SMALL_BEAR_TOLERANCE_PCT: f64 = 0.0001;
const BIG_BULL_TOLERANCE_PCT: f64 = 0.0001;
const BIG_BEAR_TOLERANCE_PCT: f64 = 0.001;

/// 多头链：每一对 fast > slow × (1 + tol/100)
pub fn is_bullish_chain(values: &[f64], tolerance_pct: f64) -> bool {
    values
        .windows(2)
        .all(|w| w[0] > w[1] * (1.0 + tolerance_pct / 100.0))
}

/// 空头链：每一对 fast < slow × (1 - tol/100)
pub fn is_bearish_chain(values: &[f64], tolerance_pct: f64) -> bool {
    values
        .windows(2)
        .all(|w| w[0] < w[1] * (1.0 - tolerance_pct / 100.0))
}

/// EMA 链趋势状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmaChainState {
    pub small_bull: bool,
    pub small_bear: bool,
    pub big_bull: bool,
    pub big_bear: bool,
    /// 大小链同为多头
    pub all_bull: bool,
    /// 大小链同为空头
    pub all_bear: bool,
    /// 大链多头 + 小链空头（上升趋势中的回调）
    pub correction_long: bool,
    /// 大链空头 + 小链多头（下降趋势中的反弹）
    pub reaction_short: bool,
}

impl EmaChainState {
    /// 状态键名，与 [`EmaChainState::entries`] 顺序一致
    pub const KEYS: [&'static str; 8] = [
        "small_bull",
        "small_bear",
        "big_bull",
        "big_bear",
        "all_bull",
        "all_bear",
        "correction_long",
        "reaction_short",
    ];

    /// 由各周期 EMA 计算状态，任一链中存在未定义值时该链两个方向都为 false
    pub fn evaluate(emas: &[Option<f64>; 10]) -> Self {
        let small = defined(&emas[SMALL_CHAIN]);
        let big = defined(&emas[BIG_CHAIN]);

        let small_bull = small
            .as_deref()
            .is_some_and(|v| is_bullish_chain(v, SMALL_BULL_TOLERANCE_PCT));
        let small_bear = small
            .as_deref()
            .is_some_and(|v| is_bearish_chain(v, SMALL_BEAR_TOLERANCE_PCT));
        let big_bull = big
            .as_deref()
            .is_some_and(|v| is_bullish_chain(v, BIG_BULL_TOLERANCE_PCT));
        let big_bear = big
            .as_deref()
            .is_some_and(|v| is_bearish_chain(v, BIG_BEAR_TOLERANCE_PCT));

        Self {
            small_bull,
            small_bear,
            big_bull,
            big_bear,
            all_bull: big_bull && small_bull,
            all_bear: big_bear && small_bear,
            correction_long: big_bull && small_bear,
            reaction_short: big_bear && small_bull,
        }
    }

    pub fn entries(&self) -> [(&'static str, bool); 8] {
        [
            (Self::KEYS[0], self.small_bull),
            (Self::KEYS[1], self.small_bear),
            (Self::KEYS[2], self.big_bull),
            (Self::KEYS[3], self.big_bear),
            (Self::KEYS[4], self.all_bull),
            (Self::KEYS[5], self.all_bear),
            (Self::KEYS[6], self.correction_long),
            (Self::KEYS[7], self.reaction_short),
        ]
    }

    /// 按键名读取
    pub fn get(&self, key: &str) -> Option<bool> {
        self.entries()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}

fn defined(values: &[Option<f64>]) -> Option<Vec<f64>> {
    values.iter().copied().collect()
}

/// 流式 EMA 链指标
///
/// 每根K线更新全部周期的 EMA，从第一根K线起即有定义
#[derive(Debug, Clone)]
pub struct EmaChainIndicator {
    emas: Vec<EmaIndicator>,
}

impl Default for EmaChainIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl EmaChainIndicator {
    pub fn new() -> Self {
        Self {
            emas: EMA_CHAIN_PERIODS
                .iter()
                .filter_map(|p| EmaIndicator::new(*p))
                .collect(),
        }
    }
}

impl Indicator for EmaChainIndicator {
    type Input = f64;
    type Output = EmaChainState;

    fn update(&mut self, close: f64) -> EmaChainState {
        let mut values = [None; 10];
        for (slot, ema) in values.iter_mut().zip(self.emas.iter_mut()) {
            *slot = Some(ema.update(close));
        }
        EmaChainState::evaluate(&values)
    }

    fn reset(&mut self) {
        self.emas.iter_mut().for_each(|ema| ema.reset());
    }
}
