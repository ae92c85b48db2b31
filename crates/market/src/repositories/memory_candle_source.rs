//! 内存数据源

use std::collections::BTreeMap;

use rust_scalp_domain::CandleTable;

use super::{matches_timeframe, CandleSource};
use crate::error::CandleLoadError;

/// 内存中的K线表集合
#[derive(Debug, Clone, Default)]
pub struct MemoryCandleSource {
    tables: BTreeMap<String, CandleTable>,
}

impl MemoryCandleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: CandleTable) -> Self {
        self.insert(table);
        self
    }

    pub fn insert(&mut self, table: CandleTable) {
        self.tables.insert(table.instrument_id().to_string(), table);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<CandleTable> for MemoryCandleSource {
    fn from_iter<I: IntoIterator<Item = CandleTable>>(iter: I) -> Self {
        let mut source = Self::new();
        for table in iter {
            source.insert(table);
        }
        source
    }
}

impl CandleSource for MemoryCandleSource {
    fn list_instruments(&self, timeframe: Option<&str>) -> Result<Vec<String>, CandleLoadError> {
        Ok(self
            .tables
            .keys()
            .filter(|id| timeframe.map_or(true, |tf| matches_timeframe(id, tf)))
            .cloned()
            .collect())
    }

    fn load(&self, instrument_id: &str) -> Result<CandleTable, CandleLoadError> {
        self.tables
            .get(instrument_id)
            .cloned()
            .ok_or_else(|| CandleLoadError::InstrumentNotFound(instrument_id.to_string()))
    }
}
