//! 条件组合
//!
//! 多个条件集合各自维护互不重叠的键，每根K线的输出合并成一个条件字典，
//! 再交给纯函数决策器生成最终信号。组合顺序不影响结果。

use std::collections::BTreeMap;

use rust_scalp_domain::{Candle, Signal};
use tracing::error;

use crate::error::StrategyError;
use crate::framework::signal_provider::IncrementalSignalProvider;

/// 条件取值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConditionValue {
    Flag(bool),
    Number(f64),
}

/// 条件字典（键名 -> 值）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionMap {
    values: BTreeMap<&'static str, ConditionValue>,
}

impl ConditionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_flag(&mut self, key: &'static str, value: bool) {
        self.values.insert(key, ConditionValue::Flag(value));
    }

    pub fn set_number(&mut self, key: &'static str, value: f64) {
        self.values.insert(key, ConditionValue::Number(value));
    }

    /// 布尔条件，缺失或类型不符视为 false
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(ConditionValue::Flag(true)))
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(ConditionValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 合并另一组条件，键冲突时报错
    pub fn merge_disjoint(
        &mut self,
        other: ConditionMap,
        owner: &'static str,
    ) -> Result<(), StrategyError> {
        for (key, value) in other.values {
            if self.values.insert(key, value).is_some() {
                return Err(StrategyError::DuplicateConditionKey {
                    key,
                    first: "merged",
                    second: owner,
                });
            }
        }
        Ok(())
    }
}

/// 条件集合：只计算并写入自己声明的键
pub trait ConditionSet: Send {
    fn name(&self) -> &'static str;

    /// 声明拥有的键
    fn keys(&self) -> &'static [&'static str];

    /// 推进一根K线，返回本集合的条件
    fn on_candle(&mut self, candle: &Candle) -> ConditionMap;
}

/// 决策器：对合并后的条件字典与当前K线做纯读取
pub trait Decision: Send + Sync {
    fn decide(&self, conditions: &ConditionMap, candle: &Candle) -> Option<Signal>;
}

/// 由多个条件集合 + 一个决策器组成的增量信号提供者
pub struct ComposedSignalProvider {
    name: &'static str,
    sets: Vec<Box<dyn ConditionSet>>,
    decision: Box<dyn Decision>,
    conditions: ConditionMap,
}

impl ComposedSignalProvider {
    /// 构建时校验各集合声明的键互不重叠
    pub fn new(
        name: &'static str,
        sets: Vec<Box<dyn ConditionSet>>,
        decision: Box<dyn Decision>,
    ) -> Result<Self, StrategyError> {
        let mut owners: BTreeMap<&'static str, &'static str> = BTreeMap::new();
        for set in &sets {
            for key in set.keys() {
                if let Some(first) = owners.insert(key, set.name()) {
                    return Err(StrategyError::DuplicateConditionKey {
                        key,
                        first,
                        second: set.name(),
                    });
                }
            }
        }
        Ok(Self {
            name,
            sets,
            decision,
            conditions: ConditionMap::new(),
        })
    }

    /// 最近一根K线的合并条件
    pub fn conditions(&self) -> &ConditionMap {
        &self.conditions
    }

    /// 推进所有集合并合并条件，未声明的键被丢弃
    fn refresh(&mut self, candle: &Candle) -> Result<(), StrategyError> {
        let mut merged = ConditionMap::new();
        for set in self.sets.iter_mut() {
            let mut own = set.on_candle(candle);
            let declared = set.keys();
            own.values.retain(|k, _| declared.contains(k));
            merged.merge_disjoint(own, set.name())?;
        }
        self.conditions = merged;
        Ok(())
    }
}

impl IncrementalSignalProvider for ComposedSignalProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn advance(&mut self, candle: &Candle) -> Option<Signal> {
        if let Err(e) = self.refresh(candle) {
            error!("[条件组合] 条件合并失败: provider={}, err={}", self.name, e);
            return None;
        }
        self.decision.decide(&self.conditions, candle)
    }

    fn observe(&mut self, candle: &Candle) {
        if let Err(e) = self.refresh(candle) {
            error!("[条件组合] 条件合并失败: provider={}, err={}", self.name, e);
        }
    }
}
