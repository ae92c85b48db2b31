//! 单标的回测任务
//!
//! 数据错误与策略错误都在这里被隔离：该标的贡献 0 笔交易，只记录日志

use std::time::Instant;

use tracing::{debug, error, warn};

use rust_scalp_domain::Trade;
use rust_scalp_market::CandleSource;
use rust_scalp_strategies::{simulate, StrategyConfig};

/// 任务状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Completed,
    /// K线表无法读取或内容非法
    Skipped(String),
    /// 策略计算出错或 worker 异常退出
    Failed(String),
}

/// 单标的任务结果
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub instrument_id: String,
    pub trades: Vec<Trade>,
    pub status: JobStatus,
}

impl JobOutcome {
    pub fn completed(instrument_id: impl Into<String>, trades: Vec<Trade>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            trades,
            status: JobStatus::Completed,
        }
    }

    pub fn skipped(instrument_id: impl Into<String>, reason: String) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            trades: Vec::new(),
            status: JobStatus::Skipped(reason),
        }
    }

    pub fn failed(instrument_id: impl Into<String>, reason: String) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            trades: Vec::new(),
            status: JobStatus::Failed(reason),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }
}

/// 加载并模拟单个标的，任何错误都转换为空结果
pub fn run_instrument(
    source: &dyn CandleSource,
    instrument_id: &str,
    config: &StrategyConfig,
) -> JobOutcome {
    let start = Instant::now();

    let table = match source.load(instrument_id) {
        Ok(table) => table,
        Err(e) => {
            warn!("[回测任务] 跳过标的: inst_id={}, err={}", instrument_id, e);
            return JobOutcome::skipped(instrument_id, e.to_string());
        }
    };
    if table.is_empty() {
        debug!("[回测任务] 空K线表: inst_id={}", instrument_id);
        return JobOutcome::completed(instrument_id, Vec::new());
    }

    let result = config
        .build_source()
        .and_then(|signals| simulate(&table, signals, &config.simulation_config()));
    match result {
        Ok(trades) => {
            debug!(
                "[回测任务] 完成: inst_id={}, candles={}, trades={}, 耗时={}ms",
                instrument_id,
                table.len(),
                trades.len(),
                start.elapsed().as_millis()
            );
            JobOutcome::completed(instrument_id, trades)
        }
        Err(e) => {
            error!("[回测任务] 策略计算失败: inst_id={}, err={}", instrument_id, e);
            JobOutcome::failed(instrument_id, e.to_string())
        }
    }
}
